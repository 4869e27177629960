//! JSON parser for content-source documents.
//!
//! Pure functions that turn raw article, issue, basis and zoom documents into validated model
//! values. Every document is deserialized into a `Raw*` struct whose fields are all optional,
//! then validated field by field so a missing value is reported by name instead of as a
//! generic serde error.

use serde::Deserialize;

use crate::model::{
    ArticleContent, ArticleImage, ArticleIssue, Basis, Breakpoints, IssueInfo, IssuePage, Size,
    ValidationError, Zoom, ZoomKind,
};

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    byline: Option<String>,
    #[serde(default)]
    issue: Option<RawArticleIssue>,
    #[serde(default)]
    images: Vec<RawArticleImage>,
    #[serde(default)]
    blocks: Vec<String>,
    #[serde(default, rename = "similarsCount")]
    similars_count: u32,
    #[serde(default, rename = "pageName")]
    page_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawArticleIssue {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "shortDateString")]
    short_date: Option<String>,
    #[serde(default)]
    id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawArticleImage {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    text: Option<String>,
}

/// `{w, h}` size pair used by issue metadata.
#[derive(Debug, Deserialize)]
struct RawPairSize {
    w: Option<f64>,
    h: Option<f64>,
}

/// `{width, height}` size used by basis documents.
#[derive(Debug, Deserialize)]
struct RawSize {
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    heights: Option<Vec<u32>>,
    #[serde(default, rename = "pageSizes")]
    page_sizes: Option<Vec<RawPairSize>>,
    #[serde(default, rename = "magnifierPageSizes")]
    magnifier_page_sizes: Option<Vec<RawPairSize>>,
    #[serde(default)]
    pages: Option<usize>,
    #[serde(default, rename = "pageLayout")]
    page_layout: Option<Vec<RawPageLayout>>,
}

#[derive(Debug, Deserialize)]
struct RawPageLayout {
    #[serde(default, rename = "Width")]
    width: Option<f64>,
    #[serde(default, rename = "Height")]
    height: Option<f64>,
    #[serde(default, rename = "maxUnrestrictedScale")]
    max_unrestricted_scale: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawBasis {
    line: Option<RawSize>,
    column: Option<RawSize>,
    #[serde(rename = "blockMax")]
    block_max: Option<RawSize>,
}

#[derive(Debug, Deserialize)]
struct RawZoom {
    #[serde(default, rename = "maxWidth")]
    max_width: Option<u32>,
    #[serde(default, rename = "maxHeight")]
    max_height: Option<u32>,
    #[serde(default, rename = "zoomType")]
    zoom_type: Option<ZoomKind>,
    #[serde(default, rename = "fitToHeight")]
    fit_to_height: bool,
    #[serde(default, rename = "disableRestrictedScales")]
    disable_restricted_scales: bool,
}

fn from_json<'a, T: Deserialize<'a>>(raw: &'a str) -> Result<T, ValidationError> {
    serde_json::from_str(raw).map_err(|e| ValidationError::InvalidJson {
        message: e.to_string(),
    })
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField { field })
}

/// Non-negative finite dimension.
fn dimension(value: Option<f64>, field: &'static str) -> Result<f64, ValidationError> {
    let value = required(value, field)?;
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidField {
            field,
            reason: format!("expected a non-negative number, got {value}"),
        });
    }
    Ok(value)
}

/// Identifiers arrive as strings or numbers.
fn id_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Parse an article document into [`ArticleContent`].
///
/// `title` is required. Images must carry `url`, `width` and `height`; a missing image
/// dimension is reported rather than defaulted.
///
/// # Examples
///
/// ```
/// use smartflow::parser::parse_article;
///
/// let content = parse_article(r#"{"title": "Hello", "blocks": ["one", "two"]}"#).unwrap();
/// assert_eq!(content.title, "Hello");
/// assert_eq!(content.blocks.len(), 2);
/// ```
pub fn parse_article(raw: &str) -> Result<ArticleContent, ValidationError> {
    let article: RawArticle = from_json(raw)?;

    let issue = article
        .issue
        .map(|issue| -> Result<ArticleIssue, ValidationError> {
            Ok(ArticleIssue {
                title: issue.title.unwrap_or_default(),
                short_date: issue.short_date.unwrap_or_default(),
                id: id_string(required(issue.id, "issue.id")?),
            })
        })
        .transpose()?;

    let images = article
        .images
        .into_iter()
        .map(|image| {
            Ok(ArticleImage {
                url: required(image.url, "images.url")?,
                width: dimension(image.width, "images.width")?,
                height: dimension(image.height, "images.height")?,
                text: image.text,
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(ArticleContent {
        title: required(article.title, "title")?,
        subtitle: article.subtitle,
        byline: article.byline,
        issue,
        images,
        blocks: article.blocks,
        similars_count: article.similars_count,
        page_name: article.page_name,
    })
}

/// Parse issue metadata plus per-page layout into an [`IssueInfo`].
///
/// Required fields: `id`, `heights`, `pageSizes`, `magnifierPageSizes`, `pages` and
/// `pageLayout` (one `{Width, Height, maxUnrestrictedScale}` record per page). The declared
/// page count must match the layout records.
///
/// Width breakpoints come from `pageSizes[].w`; height breakpoints are the union of
/// `heights` and `pageSizes[].h`.
pub fn parse_issue(raw: &str) -> Result<IssueInfo, ValidationError> {
    let issue: RawIssue = from_json(raw)?;

    let issue_id = id_string(required(issue.id, "id")?);
    let mut heights = required(issue.heights, "heights")?;
    let page_sizes = required(issue.page_sizes, "pageSizes")?;
    let magnifier_page_sizes = required(issue.magnifier_page_sizes, "magnifierPageSizes")?;
    let declared = required(issue.pages, "pages")?;
    let page_layout = required(issue.page_layout, "pageLayout")?;

    if declared != page_layout.len() {
        return Err(ValidationError::PageCountMismatch {
            declared,
            actual: page_layout.len(),
        });
    }

    let mut widths = Vec::with_capacity(page_sizes.len());
    for size in page_sizes {
        widths.push(dimension(size.w, "pageSizes.w")?.round() as u32);
        heights.push(dimension(size.h, "pageSizes.h")?.round() as u32);
    }

    let magnifier_sizes = magnifier_page_sizes
        .into_iter()
        .map(|size| {
            Ok(Size::new(
                dimension(size.w, "magnifierPageSizes.w")?,
                dimension(size.h, "magnifierPageSizes.h")?,
            ))
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    let pages = page_layout
        .into_iter()
        .enumerate()
        .map(|(index, layout)| {
            Ok(IssuePage::new(
                index as u32 + 1,
                Size::new(
                    dimension(layout.width, "pageLayout.Width")?,
                    dimension(layout.height, "pageLayout.Height")?,
                ),
                required(layout.max_unrestricted_scale, "pageLayout.maxUnrestrictedScale")?,
            ))
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    IssueInfo::new(
        issue_id,
        Breakpoints::new(widths, heights),
        magnifier_sizes,
        pages,
    )
}

/// Parse a basis document: `{line, column, blockMax}`, each `{width, height}`.
pub fn parse_basis(raw: &str) -> Result<Basis, ValidationError> {
    let basis: RawBasis = from_json(raw)?;

    fn size(raw: Option<RawSize>, field: &'static str) -> Result<Size, ValidationError> {
        let raw = required(raw, field)?;
        Ok(Size::new(
            dimension(raw.width, field)?,
            dimension(raw.height, field)?,
        ))
    }

    Ok(Basis::new(
        size(basis.line, "line")?,
        size(basis.column, "column")?,
        size(basis.block_max, "blockMax")?,
    ))
}

/// Parse a zoom document: `{maxWidth, maxHeight, zoomType}` plus optional flags.
pub fn parse_zoom(raw: &str) -> Result<Zoom, ValidationError> {
    let zoom: RawZoom = from_json(raw)?;
    let mut parsed = Zoom::from_parts(zoom.max_width, zoom.max_height, zoom.zoom_type)?;
    parsed.fit_to_height = zoom.fit_to_height;
    parsed.disable_restricted_scales = zoom.disable_restricted_scales;
    Ok(parsed)
}
