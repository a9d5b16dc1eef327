use crate::config::{parse_ride_date, parse_ride_time};
use crate::domain::model::{RideForm, MAX_PASSENGERS, MIN_PASSENGERS};
use crate::utils::error::{Result, TaxifareError};
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, Lines};

#[derive(Debug, Clone, PartialEq)]
pub enum FormInput {
    Submitted(RideForm),
    Quit,
}

fn is_quit(line: &str) -> bool {
    matches!(line, "quit" | "exit" | "q")
}

fn parse_passengers(value: &str) -> Result<u8> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|n| (MIN_PASSENGERS..=MAX_PASSENGERS).contains(n))
        .ok_or_else(|| TaxifareError::ValidationError {
            message: format!(
                "passenger count must be a number from {} to {}, got '{}'",
                MIN_PASSENGERS, MAX_PASSENGERS, value
            ),
        })
}

fn parse_address(value: &str) -> Result<String> {
    Ok(value.trim().to_string())
}

/// Prompts until `parse` accepts the answer. An empty answer keeps `default`;
/// `None` means the user quit or stdin closed.
async fn ask<R, W, T, F>(
    lines: &mut Lines<R>,
    out: &mut W,
    label: &str,
    default: &str,
    parse: F,
) -> Result<Option<T>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Fn(&str) -> Result<T>,
{
    loop {
        out.write_all(format!("{} [{}]: ", label, default).as_bytes())
            .await?;
        out.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let answer = line.trim();
        if is_quit(answer) {
            return Ok(None);
        }

        let raw = if answer.is_empty() { default } else { answer };
        match parse(raw) {
            Ok(value) => return Ok(Some(value)),
            Err(e) => {
                out.write_all(format!("⚠️ {}\n", e).as_bytes()).await?;
            }
        }
    }
}

/// Reads one ride form, each field defaulting to the previous submission.
pub async fn read_form<R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    previous: &RideForm,
) -> Result<FormInput>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(date) = ask(
        lines,
        out,
        "Schedule your ride",
        &previous.date.to_string(),
        parse_ride_date,
    )
    .await?
    else {
        return Ok(FormInput::Quit);
    };

    let Some(time) = ask(
        lines,
        out,
        "Select pickup time",
        &previous.time.format("%H:%M").to_string(),
        parse_ride_time,
    )
    .await?
    else {
        return Ok(FormInput::Quit);
    };

    let Some(pickup_address) = ask(
        lines,
        out,
        "Please type your pickup location",
        &previous.pickup_address,
        parse_address,
    )
    .await?
    else {
        return Ok(FormInput::Quit);
    };

    let Some(dropoff_address) = ask(
        lines,
        out,
        "Please type your destination",
        &previous.dropoff_address,
        parse_address,
    )
    .await?
    else {
        return Ok(FormInput::Quit);
    };

    let Some(passenger_count) = ask(
        lines,
        out,
        "Choose the number of passengers that will join the ride",
        &previous.passenger_count.to_string(),
        parse_passengers,
    )
    .await?
    else {
        return Ok(FormInput::Quit);
    };

    Ok(FormInput::Submitted(RideForm {
        date,
        time,
        pickup_address,
        dropoff_address,
        passenger_count,
    }))
}
