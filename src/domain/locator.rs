use thiserror::Error;
use url::Url;

/// Object-storage prefix holding the scanned dispatch guides.
pub const DEFAULT_BUCKET_BASE: &str =
    "https://us-east-1.linodeobjects.com/codigoverde01-bucket/adjuntos/grupotuga/xx/CUMPLIDOS";

/// PDF reprint endpoint for SSC documents.
pub const DEFAULT_PDF_ENDPOINT: &str = "https://medicar.sis-colombia.com/pharmaser/mutualser/el_admin/comunes/plano_despacho_reimprimir_pdf.php";

/// Image extensions tried in order when locating a guía scan: the common
/// formats first, then upper-case variants.
pub const IMAGE_EXTENSIONS: [&str; 23] = [
    "jpeg", "jpg", "png", "webp", "jfif", "bmp", "gif", "tiff", "tif", "svg", "ico", "heic",
    "heif", "avif", "JPG", "JPEG", "PNG", "WEBP", "JFIF", "BMP", "GIF", "TIFF", "TIF",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocatorError {
    #[error("invalid {name} URL {value:?}: {reason}")]
    InvalidBase {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Builds the backend URLs for SSC PDFs and guía images.
///
/// Arguments are interpolated verbatim with no escaping, so the backends see
/// exactly the codes the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator {
    bucket_base: String,
    pdf_endpoint: String,
}

impl ResourceLocator {
    pub fn new(bucket_base: &str, pdf_endpoint: &str) -> Result<Self, LocatorError> {
        validate_base("bucket", bucket_base)?;
        validate_base("PDF endpoint", pdf_endpoint)?;

        Ok(Self {
            bucket_base: bucket_base.strip_suffix('/').unwrap_or(bucket_base).to_string(),
            pdf_endpoint: pdf_endpoint.to_string(),
        })
    }

    pub fn bucket_base(&self) -> &str {
        &self.bucket_base
    }

    pub fn pdf_endpoint(&self) -> &str {
        &self.pdf_endpoint
    }

    pub fn image_url(&self, guia: &str, extension: &str) -> String {
        format!("{}/{guia}/DC_{guia}.{extension}", self.bucket_base)
    }

    pub fn pdf_url(&self, ssc: &str) -> String {
        format!("{}?todos=1&id_formula={ssc}&id_punto=14", self.pdf_endpoint)
    }

    /// Every candidate image URL for a guía, in probe order.
    pub fn image_candidates(&self, guia: &str) -> Vec<String> {
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| self.image_url(guia, ext))
            .collect()
    }

    /// Scheme, host and port of both backends, for the content security policy.
    pub fn origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = [&self.bucket_base, &self.pdf_endpoint]
            .into_iter()
            .filter_map(|base| Url::parse(base).ok())
            .map(|url| url.origin().ascii_serialization())
            .collect();
        origins.dedup();
        origins
    }
}

impl Default for ResourceLocator {
    fn default() -> Self {
        Self {
            bucket_base: DEFAULT_BUCKET_BASE.to_string(),
            pdf_endpoint: DEFAULT_PDF_ENDPOINT.to_string(),
        }
    }
}

fn validate_base(name: &'static str, value: &str) -> Result<(), LocatorError> {
    let invalid = |reason: String| LocatorError::InvalidBase {
        name,
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.query().is_some() {
        return Err(invalid("must not carry a query string".to_string()));
    }
    Ok(())
}
