//! Output formatting for scan reports

use anyhow::Result;
use serde_json::json;
use std::time::Duration;
use tumbler_common::ScanReport;

/// Print the report in the requested format
pub fn print_report(report: &ScanReport, format: &str) -> Result<()> {
    let format = format.trim().to_lowercase();
    match format.as_str() {
        "json" | "j" => println!("{}", render_json(report)?),
        "text" | "t" | "" => print!("{}", render_text(report)),
        _ => {
            eprintln!("Warning: Unknown format '{}', using text", format);
            print!("{}", render_text(report));
        }
    }
    Ok(())
}

/// Found hosts first, then a short summary.
fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();

    if report.found.is_empty() {
        out.push_str("[-] No hosts found.\n");
    } else {
        out.push_str(&format!(
            "[+] Port knocking detected on {} host(s)!\n",
            report.found_count()
        ));
        for host in &report.found {
            out.push_str(&format!("[+] Host: {}\n", host));
        }
    }

    out.push_str(&format!(
        "\n  Probed: {}  Not found: {}  Failed: {}  Duration: {}\n",
        report.probed,
        report.not_found,
        report.failed,
        format_duration(report.elapsed)
    ));
    out
}

fn render_json(report: &ScanReport) -> Result<String> {
    let output = json!({
        "scan_info": {
            "duration_seconds": report.elapsed.as_secs_f64(),
            "duration_formatted": format_duration(report.elapsed),
            "probed": report.probed,
            "not_found": report.not_found,
            "failed": report.failed,
        },
        "found_count": report.found_count(),
        "found": report.found,
    });

    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format duration in a human-readable way
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs == 0 {
        format!("{}ms", millis)
    } else if total_secs < 60 {
        if millis > 0 {
            format!("{}.{:03}s", total_secs, millis)
        } else {
            format!("{}s", total_secs)
        }
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn report(found: &[Ipv4Addr]) -> ScanReport {
        ScanReport {
            found: found.to_vec(),
            probed: 3,
            not_found: 3 - found.len(),
            failed: 0,
            elapsed: Duration::from_millis(1250),
        }
    }

    #[test]
    fn test_text_lists_found_hosts() {
        let text = render_text(&report(&[Ipv4Addr::new(192, 168, 1, 11)]));
        assert!(text.starts_with("[+] Port knocking detected on 1 host(s)!\n"));
        assert!(text.contains("[+] Host: 192.168.1.11\n"));
        assert!(text.contains("Duration: 1.250s"));
    }

    #[test]
    fn test_text_without_hits() {
        let text = render_text(&report(&[]));
        assert!(text.starts_with("[-] No hosts found."));
        assert!(!text.contains("Host:"));
    }

    #[test]
    fn test_json_report() {
        let hosts = [Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 3)];
        let rendered = render_json(&report(&hosts)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["found_count"], 2);
        assert_eq!(value["found"][0], "10.0.0.1");
        assert_eq!(value["found"][1], "10.0.0.3");
        assert_eq!(value["scan_info"]["probed"], 3);
    }

    #[test]
    fn test_print_report_accepts_unknown_format() {
        assert!(print_report(&report(&[]), "csv").is_ok());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_millis(5500)), "5.500s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
    }
}
