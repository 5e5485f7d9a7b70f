//! Extraction of finding records from a KLEE output directory.
//!
//! For each `test*.assert.err` report (sorted by name) one [`FindingRecord`]
//! is produced by correlating the report with its `.ktest`/`.kquery` files
//! and with the fragment source. A directory without reports still yields a
//! single placeholder record.
//!
//! Every field is recovered independently; a miss leaves that field `None`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, info, warn};
use regex::{Regex, RegexBuilder};

use crate::effect::infer_effect;
use crate::error::{ChainError, Result};
use crate::model::{ArtifactRefs, Effect, FindingRecord, Location, TextUnit, VariableRef};

const REPORT_PREFIX: &str = "test";
const REPORT_SUFFIX: &str = ".assert.err";

fn at_locator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bat\s+([^\s:]+):(\d+)").expect("valid locator regex"))
}

fn file_line_locator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        RegexBuilder::new(r"file:\s*([^\s,]+)\s*,\s*line:\s*(\d+)")
            .case_insensitive(true)
            .build()
            .expect("valid file/line regex")
    })
}

fn assert_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(klee_assert|CB_ASSERT)\s*\(").expect("valid assert regex"))
}

fn assert_expr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:klee_assert|CB_ASSERT)\s*\(\s*(.*?)\s*\)\s*;")
            .expect("valid assert expression regex")
    })
}

fn query_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\(query\s*\[\s*(.*?)\s*\]\s*false\)").expect("valid query regex")
    })
}

fn query_alt_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\(query\s*\[\s*(.*?)\s*\]\s*\(Eq false.*?\)\s*\)")
            .expect("valid alternate query regex")
    })
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// List failure reports in `dir`, sorted by file name.
///
/// A missing directory yields no reports.
pub fn discover_reports(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        debug!("result directory {} absent; treating as zero artifacts", dir.display());
        return Ok(Vec::new());
    }

    let mut reports = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ChainError::io(dir, e))? {
        let entry = entry.map_err(|e| ChainError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(REPORT_PREFIX) && name.ends_with(REPORT_SUFFIX) && entry.path().is_file()
        {
            reports.push(entry.path());
        }
    }
    reports.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(reports)
}

/// Test id of a report: the leading dot-delimited component of its file name.
pub fn test_id(report: &Path) -> Option<String> {
    let name = report.file_name()?.to_string_lossy();
    name.split('.').next().filter(|s| !s.is_empty()).map(str::to_string)
}

/// Parse an `at <file>:<line>` or `file: X, line: N` locator from a report body.
///
/// Line numbers are 1-based; a locator naming line 0 is treated as absent.
pub fn parse_locator(body: &str) -> Option<(String, usize)> {
    let caps = at_locator_re().captures(body).or_else(|| file_line_locator_re().captures(body))?;
    let line = caps[2].parse::<usize>().ok().filter(|&n| n >= 1)?;
    Some((caps[1].to_string(), line))
}

/// 1-based line number of the first assertion-macro call in `source`.
pub fn find_assert_line(source: &str) -> Option<usize> {
    source.lines().position(|line| assert_call_re().is_match(line)).map(|i| i + 1)
}

fn assert_expr_on(line: &str) -> Option<String> {
    assert_expr_re().captures(line).map(|c| c[1].to_string())
}

/// Argument of the assertion-macro call on `line_no`, or of the first call in the file.
pub fn extract_assert_expr(source: &str, line_no: Option<usize>) -> Option<String> {
    let lines: Vec<&str> = source.lines().collect();
    let on_line = line_no
        .filter(|&n| n >= 1 && n <= lines.len())
        .and_then(|n| assert_expr_on(lines[n - 1]));
    if on_line.is_some() {
        return on_line;
    }
    lines.iter().find_map(|line| assert_expr_on(line))
}

/// Text of 1-based `line_no`, trailing whitespace trimmed; `None` if out of range or blank.
pub fn read_line(source: &str, line_no: usize) -> Option<String> {
    if line_no == 0 {
        return None;
    }
    source
        .lines()
        .nth(line_no - 1)
        .map(|l| l.trim_end().to_string())
        .filter(|l| !l.is_empty())
}

/// Precondition in engine-query form, from the text of a `.kquery` file.
pub fn parse_precondition(kquery: &str) -> Option<String> {
    let caps = query_re().captures(kquery).or_else(|| query_alt_re().captures(kquery))?;
    let body = whitespace_re().replace_all(caps[1].trim(), " ");
    Some(format!("(query [{body}] false)"))
}

/// Literal negation of an assertion expression.
pub fn negate(expr: &str) -> String {
    format!("!({expr})")
}

/// Inputs shared by every record of one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    /// KLEE output directory; `None` means no artifacts.
    pub klee_dir: Option<PathBuf>,
    pub step: String,
    pub vars: Vec<String>,
    /// Scaffold used for effect inference.
    pub scaffold: PathBuf,
    /// Fragment source used for location, target, and assertion.
    pub source: PathBuf,
    pub vuln_type: String,
    pub cwe: u32,
}

/// What a single failure report contributes to its record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ReportFields {
    location: Option<(String, usize)>,
    artifacts: ArtifactRefs,
    precondition: Option<String>,
}

fn posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    })
}

fn read_report_fields(klee_dir: &Path, report: &Path) -> ReportFields {
    let mut fields = ReportFields::default();

    match fs::read(report) {
        Ok(bytes) => fields.location = parse_locator(&String::from_utf8_lossy(&bytes)),
        Err(e) => warn!("could not read report {}: {e}", report.display()),
    }

    let Some(tid) = test_id(report) else {
        return fields;
    };

    let ktest = klee_dir.join(format!("{tid}.ktest"));
    if ktest.exists() {
        fields.artifacts.ktest = Some(posix(&ktest));
    }

    let kquery = klee_dir.join(format!("{tid}.kquery"));
    if kquery.exists() {
        fields.artifacts.kquery = Some(posix(&kquery));
        match fs::read(&kquery) {
            Ok(bytes) => fields.precondition = parse_precondition(&String::from_utf8_lossy(&bytes)),
            Err(e) => warn!("could not read query {}: {e}", kquery.display()),
        }
    }

    fields
}

/// Build the finding records for a run without writing them.
pub fn extract_findings(request: &ExtractRequest) -> Result<Vec<FindingRecord>> {
    let source = TextUnit::load("source", &request.source)?;
    let scaffold = TextUnit::load("main", &request.scaffold)?;

    let tag = infer_effect(&scaffold.text);
    let effect = Effect {
        segment: tag.segment.map(|s| s.to_uppercase()),
        action: tag.action.map(|a| a.to_uppercase()),
    };

    let source_name = source
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source_abs = posix(&absolute(&source.path));
    let variables: Vec<VariableRef> = request.vars.iter().map(VariableRef::new).collect();

    let reports = match &request.klee_dir {
        Some(dir) => discover_reports(dir)?,
        None => Vec::new(),
    };
    let passes: Vec<Option<&PathBuf>> =
        if reports.is_empty() { vec![None] } else { reports.iter().map(Some).collect() };

    let mut records = Vec::with_capacity(passes.len());
    for report in passes {
        // The placeholder pass (no reports) carries no location or target.
        let (fields, location) = match (report, &request.klee_dir) {
            (Some(report), Some(dir)) => {
                let mut fields = read_report_fields(dir, report);
                let location = fields.location.take().or_else(|| {
                    debug!("no locator in report; scanning {} for an assertion", source_name);
                    find_assert_line(&source.text).map(|line| (source_name.clone(), line))
                });
                (fields, location)
            }
            _ => (ReportFields::default(), None),
        };
        let line_no = location.as_ref().map(|(_, line)| *line);

        let assertion = extract_assert_expr(&source.text, line_no);
        let target = line_no.and_then(|n| read_line(&source.text, n + 1));
        let postcondition = assertion.as_deref().map(negate);

        records.push(FindingRecord {
            vuln_type: request.vuln_type.clone(),
            cwe: request.cwe,
            step: request.step.clone(),
            file: source_abs.clone(),
            location: location.map(|(file, line)| Location { file, line }),
            target,
            variables: variables.clone(),
            assumptions: Vec::new(),
            assertion,
            precondition: fields.precondition,
            postcondition,
            effect: effect.clone(),
            artifacts: fields.artifacts,
        });
    }

    Ok(records)
}

/// Serialize records as a pretty-printed JSON array to `out`, creating parent directories.
pub fn write_findings(records: &[FindingRecord], out: &Path) -> Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ChainError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(out, json).map_err(|e| ChainError::io(out, e))?;
    Ok(())
}

/// Extract findings and write them to `out`; returns the record count.
pub fn extract_to_file(request: &ExtractRequest, out: &Path) -> Result<usize> {
    let records = extract_findings(request)?;
    write_findings(&records, out)?;
    info!("wrote {} finding record(s) for step {}", records.len(), request.step);
    Ok(records.len())
}
