use crate::error::{AppError, AppResult};
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use std::path::{Path, PathBuf};

/// Page path to the HTML shell served for it.
const PAGES: &[(&str, &str)] = &[
    ("/", "index.html"),
    ("/verify", "verify.html"),
    ("/about-you", "about-you.html"),
    ("/your-type", "your-type.html"),
    ("/youre-all-set", "youre-all-set.html"),
    ("/dashboard", "dashboard.html"),
];

/// Directory holding the prebuilt onboarding pages.
#[derive(Debug, Clone)]
pub struct StaticPages {
    root: PathBuf,
}

impl StaticPages {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_for(path: &str) -> Option<&'static str> {
        PAGES
            .iter()
            .find(|(page, _)| *page == path)
            .map(|(_, file)| *file)
    }

    pub async fn load(&self, path: &str) -> AppResult<String> {
        let file = Self::file_for(path)
            .ok_or_else(|| AppError::NotFound(format!("No page at {path}")))?;
        let full = self.root.join(file);

        tokio::fs::read_to_string(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("No page at {path}"))
            } else {
                AppError::InternalError(format!("Failed to read {}: {e}", full.display()))
            }
        })
    }
}

/// Serves one of the onboarding pages. Access control happens in the session
/// gate before this runs.
pub async fn page(pages: web::Data<StaticPages>, req: HttpRequest) -> Result<HttpResponse> {
    match pages.load(req.path()).await {
        Ok(html) => Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(html)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn pages_config(cfg: &mut web::ServiceConfig) {
    for (path, _) in PAGES {
        cfg.route(*path, web::get().to(page));
    }
}
