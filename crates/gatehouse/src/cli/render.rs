//! Output rendering for the CLI.
//!
//! Everything here writes to a caller-supplied `io::Write` so the same
//! rendering serves stdout, the interactive menu and tests.

use std::io;

use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Style};

use crate::error::{Error, ErrorKind};
use crate::health::HealthReport;
use crate::occupancy::{Availability, Occupancy};
use crate::visitor::Visitor;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Write any serializable value as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<T: Serialize + ?Sized>(out: &mut impl io::Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// One visitor, one line.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_visitor_line(out: &mut impl io::Write, visitor: &Visitor) -> io::Result<()> {
    writeln!(
        out,
        "ID: {} | Plate: {} | Name: {} | Unit: {} | Status: {} | Registered: {}",
        visitor.id,
        visitor.license_plate,
        visitor.name,
        visitor.unit_number,
        visitor.status,
        visitor.registered_at.format(TIMESTAMP_FORMAT),
    )
}

/// Every field of one visitor.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_visitor_detail(out: &mut impl io::Write, visitor: &Visitor) -> io::Result<()> {
    writeln!(out, "ID:            {}", visitor.id)?;
    writeln!(out, "Name:          {}", visitor.name)?;
    writeln!(out, "IC number:     {}", visitor.ic_number)?;
    writeln!(out, "License plate: {}", visitor.license_plate)?;
    writeln!(out, "Unit:          {}", visitor.unit_number)?;
    writeln!(out, "Status:        {}", visitor.status)?;
    writeln!(
        out,
        "Registered:    {}",
        visitor.registered_at.format(TIMESTAMP_FORMAT)
    )?;
    writeln!(
        out,
        "Last updated:  {}",
        visitor.last_updated.format(TIMESTAMP_FORMAT)
    )
}

/// A table of visitors.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_visitor_table(out: &mut impl io::Write, visitors: &[Visitor]) -> io::Result<()> {
    if visitors.is_empty() {
        return writeln!(out, "No visitors registered yet.");
    }

    let mut builder = Builder::default();
    builder.push_record([
        "ID",
        "Visitor Name",
        "IC Number",
        "License Plate",
        "Unit No.",
        "Status",
        "Registered At",
    ]);

    for visitor in visitors {
        builder.push_record([
            visitor.id.to_string(),
            visitor.name.clone(),
            visitor.ic_number.clone(),
            visitor.license_plate.clone(),
            visitor.unit_number.clone(),
            visitor.status.to_string(),
            visitor.registered_at.format(TIMESTAMP_FORMAT).to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);

    writeln!(out, "{table}")
}

/// Visitors in the requested format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_visitors(
    out: &mut impl io::Write,
    visitors: &[Visitor],
    format: super::OutputFormat,
) -> io::Result<()> {
    match format {
        super::OutputFormat::Json => write_json(out, visitors),
        super::OutputFormat::Table => write_visitor_table(out, visitors),
        super::OutputFormat::Plain => {
            if visitors.is_empty() {
                return writeln!(out, "No visitors found.");
            }
            for visitor in visitors {
                write_visitor_line(out, visitor)?;
            }
            Ok(())
        }
    }
}

/// The parking dashboard.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_occupancy(out: &mut impl io::Write, occupancy: &Occupancy) -> io::Result<()> {
    writeln!(out, "Parking Dashboard")?;
    writeln!(out, "=================")?;
    writeln!(
        out,
        "Occupied spots:  {} ({:.1}% full)",
        occupancy.active, occupancy.occupancy_percent
    )?;
    writeln!(out, "Available spots: {}", occupancy.available_spots)?;
    writeln!(out, "Total capacity:  {}", occupancy.total_spots)?;
    writeln!(out, "Visitors left:   {}", occupancy.left)?;
    writeln!(out)?;

    match occupancy.availability {
        Availability::Full => writeln!(out, "PARKING FULL - no spots available!"),
        Availability::Low => writeln!(
            out,
            "Low availability - only {} spots remaining!",
            occupancy.available_spots
        ),
        Availability::Open => writeln!(
            out,
            "Parking available - {} spots free.",
            occupancy.available_spots
        ),
    }
}

/// The health report.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_health(out: &mut impl io::Write, report: &HealthReport) -> io::Result<()> {
    let state = if report.ok { "ok" } else { "UNAVAILABLE" };
    writeln!(out, "Status: {state}")?;
    writeln!(
        out,
        "Store:  {}",
        if report.store_reachable {
            "reachable"
        } else {
            "unreachable"
        }
    )?;
    writeln!(out, "Detail: {}", report.detail)
}

/// An error, labelled by kind, with a hint about what to do next.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_error(out: &mut impl io::Write, err: &Error) -> io::Result<()> {
    let kind = err.kind();
    writeln!(out, "error ({kind}): {err}")?;
    writeln!(out, "hint: {}", kind.hint())
}

/// Process exit status for a failed command.
#[must_use]
pub fn exit_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Validation => 2,
        ErrorKind::DuplicateKey => 3,
        ErrorKind::NotFound => 4,
        ErrorKind::InvalidStatus => 5,
        ErrorKind::StorageUnavailable => 6,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::cli::OutputFormat;
    use crate::error::UniqueField;
    use crate::visitor::{VisitorId, VisitorStatus};

    fn alice() -> Visitor {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        Visitor {
            id: VisitorId::new(1),
            name: "Alice".to_string(),
            ic_number: "901231-14-5678".to_string(),
            license_plate: "ABC1234".to_string(),
            unit_number: "A-1-01".to_string(),
            status: VisitorStatus::Active,
            registered_at: at,
            last_updated: at,
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_visitor_line() {
        let text = render(|out| write_visitor_line(out, &alice()));
        assert_eq!(
            text,
            "ID: 1 | Plate: ABC1234 | Name: Alice | Unit: A-1-01 | Status: Active | Registered: 2026-10-18 09:30\n"
        );
    }

    #[test]
    fn test_visitor_table_contains_headers_and_rows() {
        let text = render(|out| write_visitor_table(out, &[alice()]));
        assert!(text.contains("License Plate"));
        assert!(text.contains("ABC1234"));
        assert!(text.contains("2026-10-18 09:30"));
    }

    #[test]
    fn test_empty_listing() {
        let text = render(|out| write_visitors(out, &[], OutputFormat::Table));
        assert!(text.contains("No visitors registered yet."));

        let text = render(|out| write_visitors(out, &[], OutputFormat::Plain));
        assert!(text.contains("No visitors found."));

        let text = render(|out| write_visitors(out, &[], OutputFormat::Json));
        assert_eq!(text.trim(), "[]");
    }

    #[test]
    fn test_json_listing() {
        let text = render(|out| write_visitors(out, &[alice()], OutputFormat::Json));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["license_plate"], "ABC1234");
        assert_eq!(value[0]["status"], "Active");
    }

    #[test]
    fn test_detail() {
        let text = render(|out| write_visitor_detail(out, &alice()));
        assert!(text.contains("IC number:     901231-14-5678"));
        assert!(text.contains("Last updated:"));
    }

    #[test]
    fn test_occupancy_messages() {
        let occupancy = Occupancy::from_visitors(&[alice()], 1, 0);
        let text = render(|out| write_occupancy(out, &occupancy));
        assert!(text.contains("PARKING FULL"));

        let occupancy = Occupancy::from_visitors(&[alice()], 200, 20);
        let text = render(|out| write_occupancy(out, &occupancy));
        assert!(text.contains("199 spots free"));
        assert!(text.contains("0.5% full"));
    }

    #[test]
    fn test_error_rendering_names_the_kind() {
        let err = Error::DuplicateKey {
            field: UniqueField::IcNumber,
            value: "901231-14-5678".to_string(),
        };
        let text = render(|out| write_error(out, &err));
        assert!(text.starts_with("error (duplicate):"));
        assert!(text.contains("hint: this visitor or vehicle is already registered"));

        let err = Error::NotFound {
            id: VisitorId::new(9),
        };
        let text = render(|out| write_error(out, &err));
        assert!(text.starts_with("error (not found):"));

        let err = Error::unavailable("timed out");
        let text = render(|out| write_error(out, &err));
        assert!(text.starts_with("error (storage unavailable):"));
    }

    #[test]
    fn test_terminal_io_error_is_labelled() {
        let err = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed"));
        let text = render(|out| write_error(out, &err));
        assert!(text.starts_with("error (storage unavailable): I/O error: stdin closed"));
        assert!(text.contains("hint: "));
        assert_eq!(exit_status(err.kind()), 6);
    }

    #[test]
    fn test_health() {
        let text = render(|out| write_health(out, &HealthReport::unreachable("refused")));
        assert!(text.contains("UNAVAILABLE"));
        assert!(text.contains("unreachable"));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let mut codes = vec![
            exit_status(ErrorKind::Validation),
            exit_status(ErrorKind::DuplicateKey),
            exit_status(ErrorKind::NotFound),
            exit_status(ErrorKind::InvalidStatus),
            exit_status(ErrorKind::StorageUnavailable),
        ];
        assert!(codes.iter().all(|&code| code > 1));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 5);
    }
}
