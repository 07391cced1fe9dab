//! Single-page visit slip.
//!
//! Layout is computed first as a list of [`Mark`]s in points with a top-left
//! origin, then painted onto an A4 PDF page. Nothing reflows: values longer
//! than their box simply overflow it.

use std::path::{Path, PathBuf};

use printpdf::image_crate::GenericImageView;
use printpdf::{
    image_crate, BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm,
    PdfDocument, PdfLayerReference, Point, Pt, Rgb,
};
use thiserror::Error;

use crate::models::AdminVisitRecord;

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 40.0;
const LOGO_WIDTH: f32 = 60.0;

const TITLE: &str = "RELAX THAI SPA";
const SUBTITLE: &str = "Wellness - Therapy - Relaxation";
const FOOTER: &str = "Thank you for choosing Relax Thai Spa. We wish you wellness & relaxation.";

const INK: Shade = Shade(0x00, 0x00, 0x00);
const LABEL: Shade = Shade(0x33, 0x33, 0x33);
const HEADING: Shade = Shade(0x2c, 0x2c, 0x2c);
const MUTED: Shade = Shade(0x55, 0x55, 0x55);
const SIGNATURE: Shade = Shade(0x44, 0x44, 0x44);
const FOOTNOTE: Shade = Shade(0x77, 0x77, 0x77);
const FRAME: Shade = Shade(0x99, 0x99, 0x99);
const BOX: Shade = Shade(0xaa, 0xaa, 0xaa);
const RULE: Shade = Shade(0xcc, 0xcc, 0xcc);
const SIGN_RULE: Shade = Shade(0x33, 0x33, 0x33);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to load brand asset {path}: {reason}")]
    Asset { path: String, reason: String },
    #[error("pdf generation failed: {0}")]
    Pdf(#[from] printpdf::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shade(pub u8, pub u8, pub u8);

impl Shade {
    fn color(self) -> Color {
        Color::Rgb(Rgb::new(
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
            None,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

/// One drawing instruction. Coordinates are points from the page's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Logo {
        x: f32,
        y: f32,
        width: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        face: Face,
        shade: Shade,
    },
    Box {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        shade: Shade,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        shade: Shade,
    },
}

pub struct VisitSlipRenderer {
    logo_path: PathBuf,
    font_path: Option<PathBuf>,
}

impl VisitSlipRenderer {
    pub fn new(logo_path: PathBuf) -> Self {
        Self {
            logo_path,
            font_path: None,
        }
    }

    /// TrueType font embedded for every face. Without one the builtin
    /// Helvetica faces are used, which only cover WinAnsi.
    pub fn with_font(mut self, font_path: Option<PathBuf>) -> Self {
        self.font_path = font_path;
        self
    }

    pub fn render(&self, record: &AdminVisitRecord) -> Result<Vec<u8>, RenderError> {
        let logo = self.load_logo()?;
        let font = self.load_font()?;
        paint(&layout(record), &logo, font.as_deref())
    }

    fn load_logo(&self) -> Result<image_crate::DynamicImage, RenderError> {
        let bytes = std::fs::read(&self.logo_path)
            .map_err(|err| asset_error(&self.logo_path, err.to_string()))?;
        image_crate::load_from_memory(&bytes)
            .map_err(|err| asset_error(&self.logo_path, err.to_string()))
    }

    fn load_font(&self) -> Result<Option<Vec<u8>>, RenderError> {
        let Some(path) = &self.font_path else {
            return Ok(None);
        };
        std::fs::read(path)
            .map(Some)
            .map_err(|err| asset_error(path, err.to_string()))
    }
}

fn asset_error(path: &Path, reason: String) -> RenderError {
    RenderError::Asset {
        path: path.display().to_string(),
        reason,
    }
}

pub fn layout(record: &AdminVisitRecord) -> Vec<Mark> {
    let mut marks = Vec::new();
    let right_column = PAGE_WIDTH / 2.0 + 10.0;
    let mut y = MARGIN;

    marks.push(Mark::Box {
        x: MARGIN - 15.0,
        y: MARGIN - 15.0,
        width: PAGE_WIDTH - 50.0,
        height: PAGE_HEIGHT - 50.0,
        radius: 10.0,
        shade: FRAME,
    });

    marks.push(Mark::Logo {
        x: MARGIN,
        y,
        width: LOGO_WIDTH,
    });
    marks.push(text(TITLE, MARGIN + 80.0, y + 10.0, 26.0, Face::Bold, HEADING));
    marks.push(text(SUBTITLE, MARGIN + 80.0, y + 40.0, 10.0, Face::Regular, MUTED));
    marks.push(text(
        &format!("Date: {}", record.date),
        PAGE_WIDTH - 180.0,
        y + 20.0,
        10.0,
        Face::Regular,
        MUTED,
    ));

    y += 90.0;
    marks.push(rule(MARGIN, PAGE_WIDTH - MARGIN, y, RULE));
    y += 25.0;

    field(&mut marks, "Client Name", &record.name, MARGIN, y, 240.0);
    field(&mut marks, "Membership Card No", &record.membership, right_column, y, 200.0);
    y += 55.0;
    field(&mut marks, "Room No", &record.room_no, MARGIN, y, 150.0);
    y += 55.0;
    field(&mut marks, "Address", &record.address, MARGIN, y, PAGE_WIDTH - MARGIN * 2.0);
    y += 55.0;
    field(&mut marks, "Contact No", &record.contact, MARGIN, y, 240.0);
    field(&mut marks, "Payment Mode", &record.payment_mode, right_column, y, 240.0);
    y += 70.0;

    marks.push(text("Service Details", MARGIN, y, 14.0, Face::Bold, HEADING));
    y += 15.0;
    marks.push(rule(MARGIN, PAGE_WIDTH - MARGIN, y, RULE));
    y += 25.0;

    service_box(&mut marks, "Time In", &record.time_in, MARGIN, y, 180.0, 30.0);
    service_box(&mut marks, "Time Out", &record.time_out, MARGIN, y + 55.0, 180.0, 30.0);
    service_box(&mut marks, "Duration", &record.duration, MARGIN, y + 110.0, 180.0, 30.0);
    service_box(&mut marks, "Price", &record.price, MARGIN, y + 165.0, 180.0, 30.0);
    service_box(&mut marks, "Therapy Name", &record.therapy_name, right_column, y, 240.0, 70.0);
    service_box(&mut marks, "Therapist", &record.therapist, right_column, y + 95.0, 240.0, 30.0);
    y += 260.0;

    marks.push(text(
        "Customer Signature",
        PAGE_WIDTH - 200.0,
        y,
        10.0,
        Face::Regular,
        SIGNATURE,
    ));
    marks.push(rule(PAGE_WIDTH - 260.0, PAGE_WIDTH - MARGIN, y + 15.0, SIGN_RULE));

    let footer_x = MARGIN + (PAGE_WIDTH - MARGIN * 2.0 - text_width(FOOTER, 9.0)) / 2.0;
    marks.push(text(FOOTER, footer_x, PAGE_HEIGHT - 80.0, 9.0, Face::Regular, FOOTNOTE));

    marks
}

/// Labeled field: bold label, 26pt rounded box, value inset inside.
fn field(marks: &mut Vec<Mark>, label: &str, value: &str, x: f32, y: f32, width: f32) {
    marks.push(text(label, x, y, 10.0, Face::Bold, LABEL));
    marks.push(Mark::Box {
        x,
        y: y + 14.0,
        width,
        height: 26.0,
        radius: 5.0,
        shade: BOX,
    });
    marks.push(text(value, x + 8.0, y + 22.0, 10.0, Face::Regular, INK));
}

fn service_box(
    marks: &mut Vec<Mark>,
    label: &str,
    value: &str,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) {
    marks.push(text(label, x, y, 10.0, Face::Regular, LABEL));
    marks.push(Mark::Box {
        x,
        y: y + 14.0,
        width,
        height,
        radius: 5.0,
        shade: BOX,
    });
    marks.push(text(value, x + 8.0, y + 24.0, 10.0, Face::Regular, LABEL));
}

fn text(text: &str, x: f32, y: f32, size: f32, face: Face, shade: Shade) -> Mark {
    Mark::Text {
        text: text.to_string(),
        x,
        y,
        size,
        face,
        shade,
    }
}

fn rule(x1: f32, x2: f32, y: f32, shade: Shade) -> Mark {
    Mark::Rule { x1, x2, y, shade }
}

/// Rough Helvetica advance width; only used to centre the footer.
fn text_width(text: &str, size: f32) -> f32 {
    let units: f32 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | '.' | ',' | '\'' | '!' | '|' => 0.25,
            ' ' | 'f' | 't' | 'r' | 'I' => 0.3,
            'm' | 'w' | 'M' | 'W' => 0.8,
            c if c.is_ascii_uppercase() => 0.68,
            _ => 0.55,
        })
        .sum();
    units * size
}

/// Windows-1252 repertoire, the only characters the builtin faces can draw.
fn winansi_encodable(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{a0}'..='\u{ff}')
        || "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ".contains(c)
}

struct Canvas {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    builtin_fonts: bool,
}

impl Canvas {
    fn at(x: f32, y: f32) -> Point {
        Point::new(Mm::from(Pt(x)), Mm::from(Pt(PAGE_HEIGHT - y)))
    }

    fn text(&self, text: &str, x: f32, y: f32, size: f32, face: Face, shade: Shade) {
        if text.is_empty() {
            return;
        }
        if self.builtin_fonts && !text.chars().all(winansi_encodable) {
            log::warn!(
                "Visit slip text {text:?} has characters the builtin font drops; set SLIP_FONT_PATH to embed a font"
            );
        }
        let font = match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
        };
        // Marks position the top of the glyph box; PDF wants the baseline.
        let baseline = y + size * 0.8;
        self.layer.set_fill_color(shade.color());
        self.layer.use_text(
            text,
            size,
            Mm::from(Pt(x)),
            Mm::from(Pt(PAGE_HEIGHT - baseline)),
            font,
        );
    }

    fn rule(&self, x1: f32, x2: f32, y: f32, shade: Shade) {
        self.layer.set_outline_color(shade.color());
        self.layer.set_outline_thickness(1.0);
        self.layer.add_line(Line {
            points: vec![(Self::at(x1, y), false), (Self::at(x2, y), false)],
            is_closed: false,
        });
    }

    fn rounded_box(&self, x: f32, y: f32, width: f32, height: f32, radius: f32, shade: Shade) {
        // Cubic approximation of a quarter circle.
        let k = radius * 0.552_284_8;
        let (left, top, right, bottom) = (x, y, x + width, y + height);
        let points = vec![
            (Self::at(left + radius, top), false),
            (Self::at(right - radius, top), true),
            (Self::at(right - radius + k, top), true),
            (Self::at(right, top + radius - k), false),
            (Self::at(right, top + radius), false),
            (Self::at(right, bottom - radius), true),
            (Self::at(right, bottom - radius + k), true),
            (Self::at(right - radius + k, bottom), false),
            (Self::at(right - radius, bottom), false),
            (Self::at(left + radius, bottom), true),
            (Self::at(left + radius - k, bottom), true),
            (Self::at(left, bottom - radius + k), false),
            (Self::at(left, bottom - radius), false),
            (Self::at(left, top + radius), true),
            (Self::at(left, top + radius - k), true),
            (Self::at(left + radius - k, top), false),
            (Self::at(left + radius, top), false),
        ];
        self.layer.set_outline_color(shade.color());
        self.layer.set_outline_thickness(1.0);
        self.layer.add_line(Line {
            points,
            is_closed: true,
        });
    }

    fn logo(&self, image: &image_crate::DynamicImage, x: f32, y: f32, width: f32) {
        let (pixels_wide, pixels_high) = (image.width().max(1) as f32, image.height() as f32);
        let dpi = pixels_wide * 72.0 / width;
        let height = pixels_high * 72.0 / dpi;
        Image::from_dynamic_image(image).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm::from(Pt(x))),
                translate_y: Some(Mm::from(Pt(PAGE_HEIGHT - y - height))),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
    }
}

fn paint(
    marks: &[Mark],
    logo: &image_crate::DynamicImage,
    font: Option<&[u8]>,
) -> Result<Vec<u8>, RenderError> {
    let (doc, page, layer) = PdfDocument::new(
        "Therapy Form",
        Mm::from(Pt(PAGE_WIDTH)),
        Mm::from(Pt(PAGE_HEIGHT)),
        "Slip",
    );
    let (regular, bold) = match font {
        Some(bytes) => (doc.add_external_font(bytes)?, doc.add_external_font(bytes)?),
        None => (
            doc.add_builtin_font(BuiltinFont::Helvetica)?,
            doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
        ),
    };
    let canvas = Canvas {
        layer: doc.get_page(page).get_layer(layer),
        regular,
        bold,
        builtin_fonts: font.is_none(),
    };

    for mark in marks {
        match mark {
            Mark::Logo { x, y, width } => canvas.logo(logo, *x, *y, *width),
            Mark::Text {
                text,
                x,
                y,
                size,
                face,
                shade,
            } => canvas.text(text, *x, *y, *size, *face, *shade),
            Mark::Box {
                x,
                y,
                width,
                height,
                radius,
                shade,
            } => canvas.rounded_box(*x, *y, *width, *height, *radius, *shade),
            Mark::Rule { x1, x2, y, shade } => canvas.rule(*x1, *x2, *y, *shade),
        }
    }

    Ok(doc.save_to_bytes()?)
}
