//! Rendering layouts and classifications as text or JSON.

use std::fmt::Write as _;

use serde::Serialize;
use tyl_classify::{Classification, Classifier, Violation};
use tyl_ir::{BaseKind, TypeIdx, TypePool};
use tyl_layout::{LayoutEngine, TypeLayout};

use crate::catalogue::{Entry, Topic};
use crate::options::{Format, Options};

/// Everything reported for one type.
#[derive(Debug, Serialize)]
pub struct Report {
    pub name: String,
    pub topic: Topic,
    pub note: &'static str,
    /// `None` when the descriptor was rejected; see `error`.
    pub layout: Option<TypeLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Base placements with names resolved, in layout order.
    pub bases: Vec<BaseRow>,
    pub classification: Classification,
    pub trivial_violations: Vec<String>,
    pub standard_layout_violations: Vec<String>,
    #[serde(skip)]
    pointer_size: u64,
}

#[derive(Debug, Serialize)]
pub struct BaseRow {
    pub name: String,
    pub offset: u64,
    pub size: u64,
    pub kind: BaseKind,
}

/// Build reports for `entries` with one engine and one classifier.
pub fn build_reports(pool: &TypePool, entries: &[&Entry], options: &Options) -> Vec<Report> {
    let mut engine = LayoutEngine::new(pool, options.target);
    let classifier = Classifier::new(pool);

    entries
        .iter()
        .map(|entry| {
            let (layout, error) = match engine.layout(entry.ty) {
                Ok(layout) => (Some(layout), None),
                Err(err) => {
                    tracing::warn!(ty = %entry.name, %err, "layout rejected");
                    (None, Some(err.to_string()))
                }
            };
            let bases = layout
                .iter()
                .flat_map(|l| &l.bases)
                .map(|b| BaseRow {
                    name: type_name(pool, b.ty),
                    offset: b.offset,
                    size: b.size,
                    kind: b.kind,
                })
                .collect();
            let why = classifier.explain(entry.ty);
            let reason = |v: &Violation| describe(pool, v);
            Report {
                name: entry.name.clone(),
                topic: entry.topic,
                note: entry.note,
                layout,
                error,
                bases,
                classification: why.classification,
                trivial_violations: why.trivial_violations.iter().map(reason).collect(),
                standard_layout_violations: why
                    .standard_layout_violations
                    .iter()
                    .map(reason)
                    .collect(),
                pointer_size: options.target.pointer_size,
            }
        })
        .collect()
}

pub fn render(reports: &[Report], options: &Options) -> Result<String, serde_json::Error> {
    match options.format {
        Format::Text => {
            let mut out = String::new();
            for (i, report) in reports.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                render_text(&mut out, report);
            }
            Ok(out)
        }
        Format::Json => serde_json::to_string_pretty(reports).map(|mut s| {
            s.push('\n');
            s
        }),
    }
}

/// One line per catalogue entry, grouped by topic.
pub fn render_list(entries: &[Entry]) -> String {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for topic in Topic::ALL {
        let mut rows = entries.iter().filter(|e| e.topic == topic).peekable();
        if rows.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "{topic}:");
        for entry in rows {
            let _ = writeln!(out, "  {:width$}  {}", entry.name, entry.note);
        }
    }
    out
}

fn type_name(pool: &TypePool, ty: TypeIdx) -> String {
    pool.name(ty).map_or_else(|| ty.to_string(), str::to_owned)
}

/// Like `Violation`'s `Display`, with type indices replaced by names.
fn describe(pool: &TypePool, violation: &Violation) -> String {
    let name = |ty: &TypeIdx| type_name(pool, *ty);
    match violation {
        Violation::SharedBase(ty) => format!("has shared base `{}`", name(ty)),
        Violation::NonTrivialBase(ty) => format!("base `{}` is not trivial", name(ty)),
        Violation::NonStandardBase(ty) => format!("base `{}` is not standard layout", name(ty)),
        Violation::FieldsInMultipleLayers(layers) => {
            let layers: Vec<String> = layers.iter().map(|ty| format!("`{}`", name(ty))).collect();
            format!("fields declared in more than one layer: {}", layers.join(", "))
        }
        Violation::RepeatedBase(ty) => format!("base `{}` appears more than once", name(ty)),
        Violation::FirstFieldIsBase { field, base } => {
            format!("first field `{field}` has base type `{}`", name(base))
        }
        Violation::Unresolved(ty) => format!("`{}` is not defined", name(ty)),
        Violation::Cyclic(ty) => format!("`{}` contains itself", name(ty)),
        other => other.to_string(),
    }
}

// -- Text rendering --

const PADDING: char = '.';
const DISPATCH: char = '*';

/// A labelled byte range in the member table.
struct Row {
    offset: u64,
    size: u64,
    label: char,
    text: String,
}

fn render_text(out: &mut String, report: &Report) {
    let _ = writeln!(out, "{}  [{}]  {}", report.name, report.topic, report.note);

    match &report.layout {
        Some(layout) => render_layout(out, report, layout),
        None => {
            let _ = writeln!(
                out,
                "  error: {}",
                report.error.as_deref().unwrap_or("layout unavailable")
            );
        }
    }

    let c = report.classification;
    let _ = writeln!(
        out,
        "  trivial: {}  standard layout: {}  pod: {}",
        yes_no(c.is_trivial),
        yes_no(c.is_standard_layout),
        yes_no(c.is_pod())
    );
    for reason in &report.trivial_violations {
        let _ = writeln!(out, "    not trivial: {reason}");
    }
    for reason in &report.standard_layout_violations {
        let _ = writeln!(out, "    not standard layout: {reason}");
    }
}

fn render_layout(out: &mut String, report: &Report, layout: &TypeLayout) {
    let _ = writeln!(
        out,
        "  size {}  align {}  data {}",
        layout.size, layout.align, layout.data_size
    );

    let rows = rows(report, layout);
    let _ = writeln!(out, "  {:>6}  {:>4}     member", "offset", "size");
    let mut end = 0;
    for row in &rows {
        if row.offset > end {
            let _ = writeln!(out, "  {end:>6}  {:>4}  {PADDING}  (padding)", row.offset - end);
        }
        let _ = writeln!(out, "  {:>6}  {:>4}  {}  {}", row.offset, row.size, row.label, row.text);
        end = end.max(row.offset + row.size);
    }
    if layout.size > end {
        let _ = writeln!(out, "  {end:>6}  {:>4}  {PADDING}  (tail padding)", layout.size - end);
    }

    let _ = writeln!(out, "  bytes:");
    for line in byte_map(layout.size, &rows) {
        let _ = writeln!(out, "    {line}");
    }
}

/// Bases, the dispatch slot and fields, sorted by offset. Zero-sized
/// entries (empty bases, zero-width markers) are kept so they show up in
/// the table.
fn rows(report: &Report, layout: &TypeLayout) -> Vec<Row> {
    let mut rows = Vec::new();

    for (i, base) in report.bases.iter().enumerate() {
        let kind = match base.kind {
            BaseKind::Owned => "base",
            BaseKind::Shared => "shared base",
        };
        rows.push(Row {
            offset: base.offset,
            size: base.size,
            label: label(b'A', i),
            text: format!("{kind} {}", base.name),
        });
    }

    // An inherited slot is already inside a base's row.
    if let Some(slot) = layout.dispatch_offset {
        let inside_base = report
            .bases
            .iter()
            .any(|b| b.offset <= slot && slot < b.offset + b.size);
        if !inside_base {
            rows.push(Row {
                offset: slot,
                size: report.pointer_size,
                label: DISPATCH,
                text: "dispatch slot".to_owned(),
            });
        }
    }

    for (i, field) in layout.fields.iter().enumerate() {
        let name = if field.name.is_empty() {
            "(unnamed)"
        } else {
            field.name.as_str()
        };
        let text = match field.bits {
            Some(bits) => format!(
                "{name} : {} bits at bit {}",
                bits.bit_width, bits.bit_offset
            ),
            None => name.to_owned(),
        };
        rows.push(Row {
            offset: field.offset,
            size: field.size,
            label: label(b'a', i),
            text,
        });
    }

    rows.sort_by_key(|r| r.offset);
    rows
}

/// One character per byte, sixteen bytes per line.
fn byte_map(size: u64, rows: &[Row]) -> Vec<String> {
    let mut bytes = vec![PADDING; usize::try_from(size).unwrap_or(0)];
    for row in rows {
        for offset in row.offset..row.offset + row.size {
            if let Some(byte) = usize::try_from(offset).ok().and_then(|o| bytes.get_mut(o)) {
                *byte = row.label;
            }
        }
    }
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let mut line = format!("{:>4}  ", i * 16);
            for (j, c) in chunk.iter().enumerate() {
                if j > 0 && j % 4 == 0 {
                    line.push(' ');
                }
                line.push(*c);
            }
            line
        })
        .collect()
}

fn label(first: u8, index: usize) -> char {
    let offset = u8::try_from(index % 26).unwrap_or(0);
    char::from(first + offset)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
