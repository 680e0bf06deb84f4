//! PDF serialization of laid-out pages via printpdf.

use anyhow::{Context, Result};
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, Rgb};

use super::layout::{FontStyle, LaidOutPage, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn rgb(color: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        None,
    ))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn for_style(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Oblique => &self.oblique,
        }
    }
}

/// Serializes laid-out pages into PDF bytes.
pub fn render_pdf(pages: &[LaidOutPage], title: &str) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        pt_to_mm(PAGE_WIDTH_PT),
        pt_to_mm(PAGE_HEIGHT_PT),
        "content",
    );

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .context("add Helvetica")?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .context("add Helvetica-Bold")?,
        oblique: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .context("add Helvetica-Oblique")?,
    };

    for (i, page) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) =
                doc.add_page(pt_to_mm(PAGE_WIDTH_PT), pt_to_mm(PAGE_HEIGHT_PT), "content");
            doc.get_page(page_idx).get_layer(layer_idx)
        };

        for op in &page.ops {
            layer.set_fill_color(rgb(op.color));
            layer.use_text(
                op.text.clone(),
                op.size,
                pt_to_mm(op.x),
                pt_to_mm(op.y),
                fonts.for_style(op.style),
            );
        }
    }

    doc.save_to_bytes().context("serialize PDF")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::TextOp;

    #[test]
    fn test_pt_to_mm_letter_width() {
        // 612pt is exactly 215.9mm.
        assert!((pt_to_mm(612.0).0 - 215.9).abs() < 0.01);
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let pages = vec![LaidOutPage {
            ops: vec![TextOp {
                x: 50.0,
                y: 742.0,
                size: 22.0,
                style: FontStyle::Bold,
                color: (0, 0, 0),
                text: "Asha Rao".to_string(),
            }],
        }];
        let bytes = render_pdf(&pages, "resume").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
