//! Corporation code lookup against OpenDART's `CORPCODE.xml` list.
//!
//! OpenDART serves the list from `corpCode.xml` as a zip archive holding one
//! XML file. An already-extracted copy can be loaded from disk instead.
//! Each entry looks like:
//!
//! ```xml
//! <list>
//!     <corp_code>00126380</corp_code>
//!     <corp_name>삼성전자</corp_name>
//!     <stock_code>005930</stock_code>
//!     <modify_date>20230110</modify_date>
//! </list>
//! ```

use std::io::{Cursor, Read};
use std::path::Path;

use filingwatch_core::ProviderError;
use quick_xml::Reader;
use quick_xml::events::Event;

use super::types::check_status;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpCodeEntry {
    pub corp_code: String,
    pub corp_name: String,
    pub stock_code: String,
    pub modify_date: String,
}

impl CorpCodeEntry {
    fn is_listed(&self) -> bool {
        !self.stock_code.trim().is_empty()
    }
}

/// `true` for an 8-digit OpenDART corporation code.
pub fn is_corp_code(s: &str) -> bool {
    s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn load_corp_codes(path: &Path) -> Result<Vec<CorpCodeEntry>, ProviderError> {
    let xml = std::fs::read_to_string(path).map_err(|e| {
        ProviderError::Config(format!("reading corp code list {}: {e}", path.display()))
    })?;
    parse_corp_codes(&xml)
}

/// Unpack the `corpCode.xml` download and parse the XML inside.
///
/// Failures come back as a small XML status document instead of an
/// archive; those are mapped through the usual status codes.
pub fn unpack_corp_codes(body: &[u8]) -> Result<Vec<CorpCodeEntry>, ProviderError> {
    if !body.starts_with(ZIP_MAGIC) {
        let text = String::from_utf8_lossy(body);
        return match status_document(&text) {
            Some((status, message)) => {
                check_status(&status, &message)?;
                Err(ProviderError::Parse(format!("corp code list: status {status} without an archive")))
            }
            None => Err(ProviderError::Parse("corp code list: response is not a zip archive".into())),
        };
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(body))
        .map_err(|e| ProviderError::Parse(format!("corp code archive: {e}")))?;
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| ProviderError::Parse(format!("corp code archive: {e}")))?;
        if !file.name().to_ascii_lowercase().ends_with(".xml") {
            continue;
        }
        let mut xml = String::new();
        file.read_to_string(&mut xml)
            .map_err(|e| ProviderError::Parse(format!("corp code archive {}: {e}", file.name())))?;
        return parse_corp_codes(&xml);
    }
    Err(ProviderError::Parse("corp code archive holds no XML file".into()))
}

/// `<status>` and `<message>` of an OpenDART XML error document.
fn status_document(xml: &str) -> Option<(String, String)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut field: Option<Vec<u8>> = None;
    let mut status = None;
    let mut message = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => field = Some(e.name().as_ref().to_vec()),
            Ok(Event::Text(t)) => {
                let text = t.unescape().ok()?.trim().to_string();
                match field.as_deref() {
                    Some(b"status") => status = Some(text),
                    Some(b"message") => message = text,
                    _ => {}
                }
            }
            Ok(Event::End(_)) => field = None,
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
    }
    status.map(|s| (s, message))
}

pub fn parse_corp_codes(xml: &str) -> Result<Vec<CorpCodeEntry>, ProviderError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<CorpCodeEntry> = None;
    let mut field: Option<Vec<u8>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                if name == b"list" {
                    current = Some(CorpCodeEntry::default());
                } else {
                    field = Some(name);
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(entry), Some(name)) = (current.as_mut(), field.as_deref()) {
                    let text = t
                        .unescape()
                        .map_err(|e| ProviderError::Parse(format!("corp code list: {e}")))?
                        .trim()
                        .to_string();
                    match name {
                        b"corp_code" => entry.corp_code = text,
                        b"corp_name" => entry.corp_name = text,
                        b"stock_code" => entry.stock_code = text,
                        b"modify_date" => entry.modify_date = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"list"
                    && let Some(entry) = current.take()
                    && !entry.corp_code.is_empty()
                {
                    entries.push(entry);
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ProviderError::Parse(format!(
                    "corp code list at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(entries)
}

/// Resolve a corporation code from a code, stock code, or company name.
///
/// Order: 8-digit code as-is, exact 6-digit stock code, exact name, then a
/// unique substring match (listed companies win ties).
pub fn resolve_corp_code(query: &str, entries: &[CorpCodeEntry]) -> Result<String, ProviderError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ProviderError::Config("corporation identifier cannot be empty".into()));
    }
    if is_corp_code(query) {
        return Ok(query.to_string());
    }

    if query.len() == 6
        && query.bytes().all(|b| b.is_ascii_digit())
        && let Some(entry) = entries.iter().find(|e| e.stock_code == query)
    {
        return Ok(entry.corp_code.clone());
    }

    let wanted = query.to_lowercase();
    let exact: Vec<&CorpCodeEntry> = entries
        .iter()
        .filter(|e| e.corp_name.to_lowercase() == wanted)
        .collect();
    if let Some(entry) = pick(&exact) {
        return Ok(entry.corp_code.clone());
    }

    let partial: Vec<&CorpCodeEntry> = entries
        .iter()
        .filter(|e| e.corp_name.to_lowercase().contains(&wanted))
        .collect();
    match partial.len() {
        0 => Err(ProviderError::NotFound(format!("no corporation matches '{query}'"))),
        1 => Ok(partial[0].corp_code.clone()),
        _ => {
            let listed: Vec<&CorpCodeEntry> = partial.iter().copied().filter(|e| e.is_listed()).collect();
            if listed.len() == 1 {
                return Ok(listed[0].corp_code.clone());
            }
            let names: Vec<&str> = partial.iter().take(5).map(|e| e.corp_name.as_str()).collect();
            Err(ProviderError::Config(format!(
                "'{query}' matches {} corporations ({}); use the 8-digit corp code",
                partial.len(),
                names.join(", ")
            )))
        }
    }
}

/// Prefer a listed company among equally good matches.
fn pick<'a>(candidates: &[&'a CorpCodeEntry]) -> Option<&'a CorpCodeEntry> {
    candidates
        .iter()
        .find(|e| e.is_listed())
        .or_else(|| candidates.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::zipped;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<result>
    <list>
        <corp_code>00126380</corp_code>
        <corp_name>삼성전자</corp_name>
        <stock_code>005930</stock_code>
        <modify_date>20230110</modify_date>
    </list>
    <list>
        <corp_code>00126371</corp_code>
        <corp_name>삼성전기</corp_name>
        <stock_code>009150</stock_code>
        <modify_date>20230110</modify_date>
    </list>
    <list>
        <corp_code>00999999</corp_code>
        <corp_name>삼성전자서비스</corp_name>
        <stock_code> </stock_code>
        <modify_date>20220101</modify_date>
    </list>
    <list>
        <corp_code>01234567</corp_code>
        <corp_name>심텍 &amp; Co</corp_name>
        <stock_code>222800</stock_code>
        <modify_date>20230301</modify_date>
    </list>
</result>"#;

    fn entries() -> Vec<CorpCodeEntry> {
        parse_corp_codes(XML).unwrap()
    }

    #[test]
    fn parses_all_entries() {
        let list = entries();
        assert_eq!(list.len(), 4);
        assert_eq!(list[0].corp_code, "00126380");
        assert_eq!(list[0].corp_name, "삼성전자");
        assert_eq!(list[2].stock_code, "");
        assert_eq!(list[3].corp_name, "심텍 & Co");
    }

    #[test]
    fn corp_code_passes_through() {
        assert_eq!(resolve_corp_code("00126380", &[]).unwrap(), "00126380");
    }

    #[test]
    fn stock_code_lookup() {
        assert_eq!(resolve_corp_code("005930", &entries()).unwrap(), "00126380");
        assert_eq!(resolve_corp_code("222800", &entries()).unwrap(), "01234567");
    }

    #[test]
    fn exact_name_beats_substring() {
        assert_eq!(resolve_corp_code("삼성전자", &entries()).unwrap(), "00126380");
    }

    #[test]
    fn unique_substring_match() {
        assert_eq!(resolve_corp_code("전기", &entries()).unwrap(), "00126371");
    }

    #[test]
    fn ambiguous_substring_is_config_error() {
        let err = resolve_corp_code("삼성", &entries()).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
        assert!(err.to_string().contains("matches 3"));
    }

    #[test]
    fn listed_company_wins_substring_tie() {
        // Hits 삼성전자 and the unlisted 삼성전자서비스.
        assert_eq!(resolve_corp_code("전자", &entries()).unwrap(), "00126380");
    }

    #[test]
    fn unknown_name_is_not_found() {
        assert!(resolve_corp_code("현대자동차", &entries()).unwrap_err().is_not_found());
    }

    #[test]
    fn empty_query_is_config_error() {
        assert!(matches!(resolve_corp_code("  ", &entries()), Err(ProviderError::Config(_))));
    }

    #[test]
    fn unpacks_archive() {
        let list = unpack_corp_codes(&zipped("CORPCODE.xml", XML)).unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(resolve_corp_code("005930", &list).unwrap(), "00126380");
    }

    #[test]
    fn archive_without_xml_is_parse_error() {
        let err = unpack_corp_codes(&zipped("README.txt", "nothing")).unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn status_document_maps_to_error() {
        let body = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<result><status>010</status><message>등록되지 않은 키입니다.</message></result>";
        let err = unpack_corp_codes(body.as_bytes()).unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("010"));
    }

    #[test]
    fn unrecognised_body_is_parse_error() {
        let err = unpack_corp_codes(b"<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn malformed_xml_is_parse_error() {
        let err = parse_corp_codes("<result><list><corp_code>1</list></result>").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }
}
