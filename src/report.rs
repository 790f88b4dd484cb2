use crate::lookup::{LookupResult, Report};

const NOT_FOUND_LINK: &str = "Not found";

pub fn print_table(report: &Report, wide: bool) {
    println!("Results for \"{}\"\n", report.query);
    print_rows(&report.results, wide);

    if !report.broad_results.is_empty() {
        println!("\n--- Broad web search ---");
        print_rows(&report.broad_results, wide);
    }

    let priced = report.results.iter().filter(|r| r.status.is_price()).count();
    println!(
        "\n{} suppliers | {} with a listed price | {}",
        report.results.len(),
        priced,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
}

fn print_rows(rows: &[LookupResult], wide: bool) {
    let (company_w, link_w, email_w, status_w) = if wide {
        (32, 100, 36, 48)
    } else {
        (24, 48, 28, 36)
    };

    println!(
        "{:<cw$} | {:<lw$} | {:<ew$} | {:<sw$}",
        "Company",
        "Link",
        "Contact Email",
        "Price/Status",
        cw = company_w,
        lw = link_w,
        ew = email_w,
        sw = status_w,
    );
    println!("{}", "-".repeat(company_w + link_w + email_w + status_w + 9));

    for r in rows {
        let link = r.link.as_deref().unwrap_or(NOT_FOUND_LINK);
        println!(
            "{:<cw$} | {:<lw$} | {:<ew$} | {:<sw$}",
            truncate(&r.company, company_w),
            truncate(link, link_w),
            truncate(&r.email, email_w),
            truncate(&r.status.to_string(), status_w),
            cw = company_w,
            lw = link_w,
            ew = email_w,
            sw = status_w,
        );
    }
}

pub fn print_json(report: &Report) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Cut to `max` characters, ending in "..." when shortened.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::fetch::FetchPath;
    use crate::parser::extract::PriceStatus;

    #[test]
    fn truncate_keeps_width() {
        assert_eq!(truncate("Thermo Fisher Life Technologies", 16), "Thermo Fisher...");
        assert_eq!(truncate("QIAGEN", 16), "QIAGEN");
        assert_eq!(truncate("Bio-Rad €", 9), "Bio-Rad €");
    }

    #[test]
    fn json_report_shape() {
        let report = Report {
            query: "RNeasy 74104".into(),
            generated_at: Utc::now(),
            results: vec![LookupResult {
                company: "QIAGEN LLC".into(),
                link: None,
                email: "Not provided".into(),
                status: PriceStatus::Hidden("Login for price".into()),
                source: Some(FetchPath::Static),
            }],
            broad_results: vec![],
        };
        let v = serde_json::to_value(&report).unwrap();
        let row = &v["results"][0];
        assert_eq!(row["link"], serde_json::Value::Null);
        assert_eq!(row["status"]["kind"], "hidden");
        assert_eq!(row["status"]["detail"], "Login for price");
        assert_eq!(row["source"], "static");
    }
}
