//! Direct OOXML part reading for what calamine does not expose:
//! cell styles, merge regions and column widths.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::address::{CellRange, CellRef};
use crate::error::{SheetError, SheetResult};
use crate::types::{normalize_color, BorderLine, Borders, CellStyle, HorizontalAlign};

// Excel stores column widths with font-metric padding included.
const CALIBRI_WIDTH_PADDING: f64 = 0.83203125;
const ALT_WIDTH_PADDING: f64 = 0.7109375;
const WIDTH_TOLERANCE: f64 = 0.0005;

/// Undo the padding rust_xlsxwriter and Excel add to stored column widths.
pub(crate) fn strip_width_padding(raw: f64) -> f64 {
    let frac = raw % 1.0;
    for padding in [CALIBRI_WIDTH_PADDING, ALT_WIDTH_PADDING] {
        if (frac - padding).abs() < WIDTH_TOLERANCE {
            let adjusted = raw - padding;
            if adjusted >= 0.0 {
                return (adjusted * 10000.0).round() / 10000.0;
            }
        }
    }
    (raw * 10000.0).round() / 10000.0
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn flag_attr(e: &BytesStart<'_>) -> bool {
    !matches!(attr_value(e, b"val").as_deref(), Some("0") | Some("false"))
}

fn rgb_attr(e: &BytesStart<'_>) -> Option<String> {
    attr_value(e, b"rgb").and_then(|rgb| normalize_color(&rgb).ok())
}

fn xml_error(part: &str, err: quick_xml::Error) -> SheetError {
    SheetError::InvalidFormat(format!("malformed {}: {}", part, err))
}

/// Styles, merges and widths found in one worksheet part.
#[derive(Debug, Default)]
pub(crate) struct SheetParts {
    pub style_ids: HashMap<CellRef, usize>,
    pub merges: Vec<CellRange>,
    /// (first col, last col, width), 1-based.
    pub column_widths: Vec<(u32, u32, f64)>,
}

/// Resolved `cellXfs` table from `xl/styles.xml`.
#[derive(Debug, Default)]
pub(crate) struct StyleTable {
    xfs: Vec<CellStyle>,
}

impl StyleTable {
    pub fn get(&self, id: usize) -> Option<&CellStyle> {
        self.xfs.get(id)
    }
}

/// The zip container of an .xlsx file.
pub(crate) struct Package {
    archive: ZipArchive<File>,
}

impl Package {
    pub fn open(path: &Path) -> SheetResult<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)
            .map_err(|e| SheetError::InvalidFormat(format!("{}: {}", path.display(), e)))?;
        Ok(Self { archive })
    }

    fn read_part(&mut self, name: &str) -> SheetResult<Option<String>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(SheetError::InvalidFormat(format!("{}: {}", name, e))),
        };
        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .map_err(|e| SheetError::InvalidFormat(format!("{}: {}", name, e)))?;
        Ok(Some(xml))
    }

    /// Sheet name -> worksheet part path inside the archive.
    pub fn sheet_paths(&mut self) -> SheetResult<HashMap<String, String>> {
        let workbook_xml = self
            .read_part("xl/workbook.xml")?
            .ok_or_else(|| SheetError::InvalidFormat("missing xl/workbook.xml".to_string()))?;
        let rels_xml = self
            .read_part("xl/_rels/workbook.xml.rels")?
            .unwrap_or_default();

        let sheet_rids = parse_sheet_rids(&workbook_xml)?;
        let targets = parse_relationship_targets(&rels_xml)?;

        Ok(sheet_rids
            .into_iter()
            .filter_map(|(name, rid)| {
                targets.get(&rid).map(|target| {
                    let full = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("xl/{}", target),
                    };
                    (name, full)
                })
            })
            .collect())
    }

    pub fn style_table(&mut self) -> SheetResult<StyleTable> {
        match self.read_part("xl/styles.xml")? {
            Some(xml) => parse_styles(&xml),
            None => Ok(StyleTable::default()),
        }
    }

    pub fn sheet_parts(&mut self, part: &str) -> SheetResult<SheetParts> {
        match self.read_part(part)? {
            Some(xml) => parse_sheet(&xml),
            None => Ok(SheetParts::default()),
        }
    }
}

fn parse_sheet_rids(xml: &str) -> SheetResult<Vec<(String, String)>> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf: Vec<u8> = Vec::new();
    let mut out = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"sheet" {
                    if let (Some(name), Some(rid)) = (attr_value(&e, b"name"), attr_value(&e, b"id")) {
                        out.push((name, rid));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("xl/workbook.xml", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

fn parse_relationship_targets(xml: &str) -> SheetResult<HashMap<String, String>> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf: Vec<u8> = Vec::new();
    let mut out = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    if let (Some(id), Some(target)) = (attr_value(&e, b"Id"), attr_value(&e, b"Target")) {
                        out.insert(id, target);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("xl/_rels/workbook.xml.rels", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

#[derive(Debug, Default, Clone)]
struct FontSpec {
    bold: bool,
    italic: bool,
    color: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
struct XfSpec {
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    align: Option<HorizontalAlign>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StyleSection {
    None,
    Fonts,
    Fills,
    Borders,
    CellXfs,
}

fn parse_styles(xml: &str) -> SheetResult<StyleTable> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf: Vec<u8> = Vec::new();

    let mut section = StyleSection::None;
    let mut fonts: Vec<FontSpec> = Vec::new();
    let mut fills: Vec<Option<String>> = Vec::new();
    let mut solid_fill = false;
    let mut borders: Vec<Borders> = Vec::new();
    let mut xfs: Vec<XfSpec> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let local = e.local_name();
                match (section, local.as_ref()) {
                    (_, b"fonts") => section = StyleSection::Fonts,
                    (_, b"fills") => section = StyleSection::Fills,
                    (_, b"borders") => section = StyleSection::Borders,
                    (_, b"cellXfs") => section = StyleSection::CellXfs,

                    (StyleSection::Fonts, b"font") => fonts.push(FontSpec::default()),
                    (StyleSection::Fonts, b"b") => {
                        if let Some(font) = fonts.last_mut() {
                            font.bold = flag_attr(&e);
                        }
                    }
                    (StyleSection::Fonts, b"i") => {
                        if let Some(font) = fonts.last_mut() {
                            font.italic = flag_attr(&e);
                        }
                    }
                    (StyleSection::Fonts, b"color") => {
                        if let Some(font) = fonts.last_mut() {
                            font.color = rgb_attr(&e);
                        }
                    }

                    (StyleSection::Fills, b"fill") => {
                        fills.push(None);
                        solid_fill = false;
                    }
                    (StyleSection::Fills, b"patternFill") => {
                        solid_fill = attr_value(&e, b"patternType").as_deref() == Some("solid");
                    }
                    (StyleSection::Fills, b"fgColor") if solid_fill => {
                        if let Some(fill) = fills.last_mut() {
                            *fill = rgb_attr(&e);
                        }
                    }

                    (StyleSection::Borders, b"border") => borders.push(Borders::default()),
                    (StyleSection::Borders, edge @ (b"left" | b"right" | b"top" | b"bottom" | b"start" | b"end")) => {
                        let line = attr_value(&e, b"style").and_then(|s| BorderLine::from_ooxml(&s));
                        if let Some(border) = borders.last_mut() {
                            match edge {
                                b"left" | b"start" => border.left = line,
                                b"right" | b"end" => border.right = line,
                                b"top" => border.top = line,
                                _ => border.bottom = line,
                            }
                        }
                    }

                    (StyleSection::CellXfs, b"xf") => {
                        let id = |key: &[u8]| {
                            attr_value(&e, key)
                                .and_then(|v| v.parse::<usize>().ok())
                                .unwrap_or(0)
                        };
                        xfs.push(XfSpec {
                            font_id: id(b"fontId"),
                            fill_id: id(b"fillId"),
                            border_id: id(b"borderId"),
                            align: None,
                        });
                    }
                    (StyleSection::CellXfs, b"alignment") => {
                        if let Some(xf) = xfs.last_mut() {
                            xf.align = attr_value(&e, b"horizontal")
                                .and_then(|h| HorizontalAlign::parse(&h).ok());
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                if matches!(
                    e.local_name().as_ref(),
                    b"fonts" | b"fills" | b"borders" | b"cellXfs"
                ) {
                    section = StyleSection::None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("xl/styles.xml", e)),
            _ => {}
        }
        buf.clear();
    }

    let resolved = xfs
        .iter()
        .map(|xf| {
            let font = fonts.get(xf.font_id).cloned().unwrap_or_default();
            CellStyle {
                bold: font.bold,
                italic: font.italic,
                font_color: font.color,
                bg_color: fills.get(xf.fill_id).cloned().flatten(),
                align: xf.align,
                borders: borders.get(xf.border_id).copied().unwrap_or_default(),
            }
        })
        .collect();

    Ok(StyleTable { xfs: resolved })
}

fn parse_sheet(xml: &str) -> SheetResult<SheetParts> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf: Vec<u8> = Vec::new();
    let mut parts = SheetParts::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"c" => {
                    let style_id = attr_value(&e, b"s")
                        .and_then(|s| s.parse::<usize>().ok())
                        .unwrap_or(0);
                    let at = attr_value(&e, b"r").and_then(|r| CellRef::parse(&r).ok());
                    if let (Some(at), true) = (at, style_id > 0) {
                        parts.style_ids.insert(at, style_id);
                    }
                }
                b"col" => {
                    let min = attr_value(&e, b"min").and_then(|v| v.parse::<u32>().ok());
                    let max = attr_value(&e, b"max").and_then(|v| v.parse::<u32>().ok());
                    let width = attr_value(&e, b"width").and_then(|v| v.parse::<f64>().ok());
                    if let (Some(min), Some(max), Some(width)) = (min, max, width) {
                        parts
                            .column_widths
                            .push((min, max, strip_width_padding(width)));
                    }
                }
                b"mergeCell" => {
                    if let Some(range) = attr_value(&e, b"ref").and_then(|r| CellRange::parse(&r).ok()) {
                        parts.merges.push(range);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("worksheet", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(parts)
}
