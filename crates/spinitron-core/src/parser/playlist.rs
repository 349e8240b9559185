//! Legacy playlist feed parser
//!
//! Parses the station playlist page and extracts one [`PlaylistEntry`]
//! per logged song, in document order.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, SpinitronError};
use crate::types::{Artist, Disk, Label, PlaylistEntry, Song};

/// Compiled selectors for one playlist row
struct RowSelectors {
    row: Selector,
    spin_anchor: Selector,
    time: Selector,
    song: Selector,
    code: Selector,
    artist: Selector,
    artist_link: Selector,
    disk: Selector,
    disk_link: Selector,
    label: Selector,
    label_link: Selector,
    year: Regex,
}

impl RowSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            row: selector(".plblock > .f2row")?,
            spin_anchor: selector(".nfo a")?,
            time: selector(".st")?,
            song: selector(".sn")?,
            code: selector("fg")?,
            artist: selector(".aw")?,
            artist_link: selector(".aw a")?,
            disk: selector(".dn")?,
            disk_link: selector(".dn a")?,
            label: selector(".ld")?,
            label_link: selector(".ld a")?,
            year: Regex::new(r"\(.*([0-9]{4})\)")
                .map_err(|e| SpinitronError::ParseError(format!("Invalid regex: {}", e)))?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| SpinitronError::ParseError(format!("Invalid selector {}: {:?}", css, e)))
}

/// Parses playlist feed HTML and returns its entries in document order
///
/// Missing optional pieces (links, year, code) yield `None` or empty
/// strings rather than errors.
///
/// # Arguments
/// * `html` - Raw HTML string from the playlist feed
///
/// # Returns
/// Vector of `PlaylistEntry`, empty if the page has no rows
///
/// # Errors
/// Returns `ParseError` if a selector fails to compile
pub fn parse_playlist(html: &str) -> Result<Vec<PlaylistEntry>> {
    let document = Html::parse_document(html);
    let selectors = RowSelectors::new()?;

    Ok(document
        .select(&selectors.row)
        .map(|row| parse_row(&row, &selectors))
        .collect())
}

/// Parses a single `.f2row` element
fn parse_row(row: &ElementRef, sel: &RowSelectors) -> PlaylistEntry {
    let song = Song {
        id: row
            .select(&sel.spin_anchor)
            .next()
            .and_then(|a| a.value().attr("name"))
            .map(str::to_string),
        time: text_of(row, &sel.time),
        name: strip_quotes(&text_of(row, &sel.song)),
        code: text_of(row, &sel.code),
    };

    let artist = Artist {
        id: link_dbid(row, &sel.artist_link),
        name: strip_quotes(&text_of(row, &sel.artist)),
    };

    let disk = Disk {
        id: link_dbid(row, &sel.disk_link),
        name: strip_quotes(&text_of(row, &sel.disk)),
        ..Disk::default()
    };

    let label = Label {
        id: link_dbid(row, &sel.label_link),
        name: strip_quotes(&text_of(row, &sel.label_link)),
        year: extract_year(&text_of(row, &sel.label), &sel.year),
    };

    PlaylistEntry {
        song,
        artist,
        disk,
        label,
    }
}

/// Concatenated, trimmed text of every element matching `selector`
fn text_of(row: &ElementRef, selector: &Selector) -> String {
    row.select(selector)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Reads the `dbid` query parameter from the first matching link
fn link_dbid(row: &ElementRef, selector: &Selector) -> Option<String> {
    let href = row.select(selector).next()?.value().attr("href")?;
    query_param(href, "dbid")
}

/// Extracts a decoded query parameter from a (possibly relative) href
fn query_param(href: &str, name: &str) -> Option<String> {
    let (_, query) = href.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);

    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == name {
            urlencoding::decode(&value.replace('+', " "))
                .ok()
                .map(|v| v.into_owned())
        } else {
            None
        }
    })
}

/// Removes typographic double quotes around titles
fn strip_quotes(text: &str) -> String {
    text.replace(['“', '”'], "").trim().to_string()
}

/// Finds a four-digit year inside parentheses, e.g. "Sub Pop (1991)"
fn extract_year(text: &str, re: &Regex) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ROWS: &str = r#"
    <html>
    <body>
    <div class="plblock">
        <div class="f2row">
            <span class="st">9:41 PM</span>
            <span class="nfo"><a name="8812345"></a><a name="ignored"></a></span>
            <span class="aw"><a href="/radio/artist.php?station=wxyz&amp;dbid=101">David Bowie</a></span>
            <span class="sn">“Heroes”</span>
            <span class="dn"><a href="/radio/disk.php?dbid=202">“Heroes”</a></span>
            <span class="ld"><a href="/radio/label.php?dbid=303">RCA</a> (1977)</span>
            <fg>L</fg>
        </div>
        <div class="f2row">
            <span class="st">9:45 PM</span>
            <span class="aw">Unknown Band</span>
            <span class="sn">Untitled</span>
            <span class="dn">Demo Tape</span>
            <span class="ld">Self-released</span>
        </div>
    </div>
    </body>
    </html>
    "#;

    #[test]
    fn test_parse_empty_html() {
        let entries = parse_playlist("<html><body></body></html>").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_parse_full_row() {
        let entries = parse_playlist(TWO_ROWS).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.song.id.as_deref(), Some("8812345"));
        assert_eq!(first.song.time, "9:41 PM");
        assert_eq!(first.song.name, "Heroes");
        assert_eq!(first.song.code, "L");
        assert_eq!(first.artist.id.as_deref(), Some("101"));
        assert_eq!(first.artist.name, "David Bowie");
        assert_eq!(first.disk.id.as_deref(), Some("202"));
        assert_eq!(first.disk.name, "Heroes");
        assert_eq!(first.label.id.as_deref(), Some("303"));
        assert_eq!(first.label.name, "RCA");
        assert_eq!(first.label.year.as_deref(), Some("1977"));
    }

    #[test]
    fn test_missing_links_give_null_ids() {
        let entries = parse_playlist(TWO_ROWS).unwrap();
        let second = &entries[1];
        assert_eq!(second.song.id, None);
        assert_eq!(second.artist.id, None);
        assert_eq!(second.artist.name, "Unknown Band");
        assert_eq!(second.disk.id, None);
        assert_eq!(second.label.id, None);
        assert_eq!(second.label.name, "");
        assert_eq!(second.label.year, None);
        assert_eq!(second.song.code, "");
    }

    #[test]
    fn test_rows_outside_block_are_ignored() {
        let html = r#"
        <div class="f2row"><span class="sn">Stray</span></div>
        <div class="plblock">
            <div class="inner"><div class="f2row"><span class="sn">Nested</span></div></div>
            <div class="f2row"><span class="sn">Direct</span></div>
        </div>
        "#;
        let entries = parse_playlist(html).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].song.name, "Direct");
    }

    #[test]
    fn test_query_param() {
        assert_eq!(query_param("/a.php?dbid=5", "dbid"), Some("5".to_string()));
        assert_eq!(query_param("/a.php?x=1&dbid=a%20b", "dbid"), Some("a b".to_string()));
        assert_eq!(query_param("/a.php?x=1", "dbid"), None);
        assert_eq!(query_param("/a.php", "dbid"), None);
        assert_eq!(query_param("/a.php?dbid=9#top", "dbid"), Some("9".to_string()));
    }

    #[test]
    fn test_extract_year() {
        let re = Regex::new(r"\(.*([0-9]{4})\)").unwrap();
        assert_eq!(extract_year("Sub Pop (1991)", &re), Some("1991".to_string()));
        assert_eq!(extract_year("Merge (reissue 2009)", &re), Some("2009".to_string()));
        assert_eq!(extract_year("Merge 2009", &re), None);
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("“Heroes”"), "Heroes");
        assert_eq!(strip_quotes("Plain"), "Plain");
    }
}
