//! Interactive menu.
//!
//! A numbered menu over the visitor service, read line by line from any
//! `BufRead`. Delete confirmation lives here, in the menu's own state; the
//! service's delete is a single step.

use std::io::{self, BufRead, Write};

use crate::error::Error;
use crate::service::VisitorService;
use crate::store::RecordStore;
use crate::visitor::{NewVisitor, VisitorId};

use super::render;

const MENU: &str = "\
========================================
    VISITOR PARKING MANAGER
========================================
1. Register New Visitor
2. View All Visitors
3. Update Visitor Status (Active/Left)
4. Delete Visitor
5. Parking Dashboard
6. Exit
----------------------------------------";

/// Print `prompt` and read one trimmed line. `None` at end of input.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn prompt(
    input: &mut impl BufRead,
    out: &mut impl Write,
    question: &str,
) -> io::Result<Option<String>> {
    write!(out, "{question}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask a yes/no question. Anything but `y` or `yes` is a no.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn confirm(input: &mut impl BufRead, out: &mut impl Write, question: &str) -> io::Result<bool> {
    let answer = prompt(input, out, &format!("{question} (y/n): "))?;
    Ok(answer.is_some_and(|a| a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes")))
}

/// Run the menu until the user exits or input ends.
///
/// Service failures are reported and the menu carries on.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub async fn run<S: RecordStore>(
    service: &VisitorService<S>,
    mut input: impl BufRead,
    mut out: impl Write,
) -> io::Result<()> {
    loop {
        writeln!(out)?;
        writeln!(out, "{MENU}")?;

        let Some(choice) = prompt(&mut input, &mut out, "Enter your choice (1-6): ")? else {
            return Ok(());
        };

        let keep_going = match choice.as_str() {
            "1" => register(service, &mut input, &mut out).await?,
            "2" => view_all(service, &mut out).await?,
            "3" => update_status(service, &mut input, &mut out).await?,
            "4" => delete(service, &mut input, &mut out).await?,
            "5" => dashboard(service, &mut out).await?,
            "6" => {
                writeln!(out, "Goodbye!")?;
                return Ok(());
            }
            _ => {
                writeln!(out, "Invalid choice. Please enter 1-6.")?;
                true
            }
        };

        if !keep_going {
            return Ok(());
        }
    }
}

/// Read several answers in a row; `None` if input ended part-way.
fn ask_all<const N: usize>(
    input: &mut impl BufRead,
    out: &mut impl Write,
    questions: [&str; N],
) -> io::Result<Option<[String; N]>> {
    let mut answers: [String; N] = std::array::from_fn(|_| String::new());
    for (answer, question) in answers.iter_mut().zip(questions) {
        match prompt(input, out, question)? {
            Some(line) => *answer = line,
            None => return Ok(None),
        }
    }
    Ok(Some(answers))
}

fn report(out: &mut impl Write, err: &Error) -> io::Result<bool> {
    render::write_error(out, err)?;
    Ok(true)
}

fn parse_id(out: &mut impl Write, raw: &str) -> io::Result<Option<VisitorId>> {
    match raw.parse::<VisitorId>() {
        Ok(id) => Ok(Some(id)),
        Err(err) => {
            render::write_error(out, &err)?;
            Ok(None)
        }
    }
}

async fn register<S: RecordStore>(
    service: &VisitorService<S>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<bool> {
    writeln!(out, "\n--- Register New Visitor ---")?;
    let Some([name, ic_number, license_plate, unit_number]) = ask_all(
        input,
        out,
        [
            "Enter visitor name: ",
            "Enter visitor IC Number (Unique): ",
            "Enter license plate (Unique): ",
            "Enter unit number visiting: ",
        ],
    )?
    else {
        return Ok(false);
    };

    match service
        .create(NewVisitor::new(name, ic_number, license_plate, unit_number))
        .await
    {
        Ok(visitor) => {
            writeln!(out, "Success! Visitor ID: {}", visitor.id)?;
            Ok(true)
        }
        Err(err) => report(out, &err),
    }
}

async fn view_all<S: RecordStore>(
    service: &VisitorService<S>,
    out: &mut impl Write,
) -> io::Result<bool> {
    writeln!(out, "\n--- All Visitors ---")?;
    match service.list().await {
        Ok(visitors) => {
            render::write_visitors(out, &visitors, super::OutputFormat::Plain)?;
            Ok(true)
        }
        Err(err) => report(out, &err),
    }
}

async fn update_status<S: RecordStore>(
    service: &VisitorService<S>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<bool> {
    writeln!(out, "\n--- Update Visitor Status ---")?;
    let Some([raw_id, status]) = ask_all(
        input,
        out,
        [
            "Enter Visitor ID to update status: ",
            "Enter new status (Active/Left): ",
        ],
    )?
    else {
        return Ok(false);
    };

    let Some(id) = parse_id(out, &raw_id)? else {
        return Ok(true);
    };

    match service.update_status(id, &status).await {
        Ok(visitor) => {
            writeln!(
                out,
                "Status updated to {} for visitor {}.",
                visitor.status, visitor.id
            )?;
            Ok(true)
        }
        Err(err) => report(out, &err),
    }
}

async fn delete<S: RecordStore>(
    service: &VisitorService<S>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<bool> {
    writeln!(out, "\n--- Delete Visitor ---")?;
    let Some(raw_id) = prompt(input, out, "Enter Visitor ID to delete: ")? else {
        return Ok(false);
    };
    let Some(id) = parse_id(out, &raw_id)? else {
        return Ok(true);
    };

    if !confirm(
        input,
        out,
        &format!("Are you sure you want to permanently delete visitor {id}?"),
    )? {
        writeln!(out, "Deletion cancelled.")?;
        return Ok(true);
    }

    match service.delete(id).await {
        Ok(()) => {
            writeln!(out, "Visitor deleted successfully!")?;
            Ok(true)
        }
        Err(err) => report(out, &err),
    }
}

async fn dashboard<S: RecordStore>(
    service: &VisitorService<S>,
    out: &mut impl Write,
) -> io::Result<bool> {
    match service.occupancy().await {
        Ok(occupancy) => {
            render::write_occupancy(out, &occupancy)?;
            Ok(true)
        }
        Err(err) => report(out, &err),
    }
}
