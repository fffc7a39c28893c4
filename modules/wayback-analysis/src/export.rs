use std::collections::HashSet;
use std::io::Write;
use std::str::FromStr;

use wayback_common::{canonicalize, normalize_domain, url_path, ArchivedRecord};

use crate::error::Result;

const UTF8_BOM: &str = "\u{feff}";
const HEADER: [&str; 4] = ["URL", "Timestamp", "Status Code", "Digest"];

const HTML_SUFFIXES: &[&str] = &[".html", ".htm", "/", "robots.txt"];
const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".svg"];

/// Which captured URLs make it into an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFilter {
    #[default]
    All,
    /// Pages (`.html`, `.htm`, directory URLs) plus robots.txt.
    HtmlOnly,
    /// `HtmlOnly` plus common image formats.
    HtmlAndImages,
}

impl ExportFilter {
    /// Suffix test on the URL with query and fragment removed, ignoring
    /// ASCII case.
    pub fn matches(self, url: &str) -> bool {
        let path = url_path(url).to_ascii_lowercase();
        let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|s| path.ends_with(s));
        match self {
            ExportFilter::All => true,
            ExportFilter::HtmlOnly => ends_with_any(HTML_SUFFIXES),
            ExportFilter::HtmlAndImages => {
                ends_with_any(HTML_SUFFIXES) || ends_with_any(IMAGE_SUFFIXES)
            }
        }
    }
}

impl FromStr for ExportFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ExportFilter::All),
            "html" => Ok(ExportFilter::HtmlOnly),
            "html-images" => Ok(ExportFilter::HtmlAndImages),
            other => Err(format!(
                "unknown filter '{other}' (expected all, html, or html-images)"
            )),
        }
    }
}

/// Records passing `filter`, optionally reduced to the first capture of
/// each canonical URL. Input order is preserved.
pub fn select(
    records: &[ArchivedRecord],
    filter: ExportFilter,
    unique_only: bool,
) -> Vec<&ArchivedRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    records
        .iter()
        .filter(|r| filter.matches(&r.url))
        .filter(|r| !unique_only || seen.insert(canonicalize(&r.url)))
        .collect()
}

/// Write records as CSV: BOM, header row, one line per record.
pub fn write_csv<'a, W: Write>(
    mut w: W,
    records: impl IntoIterator<Item = &'a ArchivedRecord>,
) -> Result<usize> {
    w.write_all(UTF8_BOM.as_bytes())?;
    write_row(&mut w, &HEADER)?;

    let mut written = 0;
    for record in records {
        write_row(
            &mut w,
            &[
                record.url.as_str(),
                record.timestamp.as_str(),
                record.status_code.as_str(),
                record.digest.as_str(),
            ],
        )?;
        written += 1;
    }
    w.flush()?;
    Ok(written)
}

/// `<domain>_filtered_urls.csv`, with path separators in a prefix query
/// flattened to `_` so the name stays in the current directory.
pub fn export_file_name(domain: &str) -> String {
    let stem: String = normalize_domain(domain)
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{stem}_filtered_urls.csv")
}

fn needs_quotes(field: &str) -> bool {
    field.contains([',', '"', '\n', '\r'])
}

fn write_row<W: Write>(w: &mut W, row: &[&str]) -> std::io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(url: &str, ts: &str) -> ArchivedRecord {
        ArchivedRecord::new(url, ts, "200", "DIGEST")
    }

    #[test]
    fn html_only_keeps_pages_and_robots() {
        let f = ExportFilter::HtmlOnly;
        assert!(f.matches("http://a.com/"));
        assert!(f.matches("http://a.com/index.html"));
        assert!(f.matches("http://a.com/old.htm"));
        assert!(f.matches("http://a.com/robots.txt"));
        assert!(f.matches("http://a.com/page.html?ref=home"));
        assert!(f.matches("http://a.com/PAGE.HTML"));
        assert!(!f.matches("http://a.com/data.json"));
        assert!(!f.matches("http://a.com/sitemap.xml"));
        assert!(!f.matches("http://a.com/notes.txt"));
        assert!(!f.matches("http://a.com/logo.png"));
    }

    #[test]
    fn html_and_images_adds_image_formats() {
        let f = ExportFilter::HtmlAndImages;
        for url in ["a.jpg", "a.jpeg", "a.png", "a.gif", "a.svg", "a.html", "robots.txt"] {
            assert!(f.matches(&format!("http://a.com/{url}")), "{url}");
        }
        assert!(!f.matches("http://a.com/app.js"));
        assert!(!f.matches("http://a.com/style.css"));
    }

    #[test]
    fn all_keeps_everything() {
        assert!(ExportFilter::All.matches("http://a.com/app.js"));
        assert!(ExportFilter::All.matches("not even a url"));
    }

    #[test]
    fn filter_names_parse() {
        assert_eq!("all".parse::<ExportFilter>(), Ok(ExportFilter::All));
        assert_eq!("HTML".parse::<ExportFilter>(), Ok(ExportFilter::HtmlOnly));
        assert_eq!("html-images".parse::<ExportFilter>(), Ok(ExportFilter::HtmlAndImages));
        assert!("pdf".parse::<ExportFilter>().is_err());
    }

    #[test]
    fn unique_keeps_first_capture_after_filtering() {
        let records = vec![
            rec("http://a.com/data.json", "1"),
            rec("http://a.com/", "2"),
            rec("http://a.com/", "3"),
            rec("http://a.com/about.html", "4"),
        ];

        let picked = select(&records, ExportFilter::HtmlOnly, true);
        let stamps: Vec<&str> = picked.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(stamps, vec!["2", "4"]);

        assert_eq!(select(&records, ExportFilter::All, false).len(), 4);
        assert_eq!(select(&records, ExportFilter::All, true).len(), 3);
    }

    #[test]
    fn unique_treats_credential_and_port_variants_as_one_url() {
        let records = vec![
            rec("http://a.com/page.html", "1"),
            rec("http://user:pw@a.com:8080/page.html", "2"),
            rec("http://a.com/other.html", "3"),
        ];

        let picked = select(&records, ExportFilter::HtmlOnly, true);
        let stamps: Vec<&str> = picked.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(stamps, vec!["1", "3"]);
    }

    #[test]
    fn csv_has_bom_header_and_rows() {
        let records = vec![rec("http://a.com/", "20100101000000")];
        let mut out = Vec::new();

        let written = write_csv(&mut out, &records).unwrap();

        assert_eq!(written, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with('\u{feff}'));
        assert_eq!(
            text.trim_start_matches('\u{feff}'),
            "URL,Timestamp,Status Code,Digest\nhttp://a.com/,20100101000000,200,DIGEST\n"
        );
    }

    #[test]
    fn csv_quotes_awkward_fields() {
        let records = vec![rec("http://a.com/?q=a,b", "1"), rec("http://a.com/\"x\"", "2")];
        let mut out = Vec::new();
        write_csv(&mut out, &records).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"http://a.com/?q=a,b\",1,"));
        assert!(text.contains("\"http://a.com/\"\"x\"\"\",2,"));
    }

    #[test]
    fn empty_export_is_just_the_header() {
        let none: Vec<ArchivedRecord> = Vec::new();
        let mut out = Vec::new();
        assert_eq!(write_csv(&mut out, &none).unwrap(), 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\u{feff}URL,Timestamp,Status Code,Digest\n"
        );
    }

    #[test]
    fn file_name_uses_bare_domain() {
        assert_eq!(export_file_name("example.com"), "example.com_filtered_urls.csv");
        assert_eq!(export_file_name("https://example.com/"), "example.com_filtered_urls.csv");
    }

    #[test]
    fn file_name_flattens_prefix_paths() {
        assert_eq!(
            export_file_name("example.com/blog"),
            "example.com_blog_filtered_urls.csv"
        );
        assert_eq!(
            export_file_name("https://example.com/a/b/"),
            "example.com_a_b_filtered_urls.csv"
        );
        assert!(!export_file_name("example.com:8080/x").contains(['/', '\\', ':']));
    }
}
