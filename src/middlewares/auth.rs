use crate::error::AppError;
use crate::models::{SESSION_COOKIE, SessionCredential};
use crate::utils::JwtService;
use actix_web::body::EitherBody;
use actix_web::http::{Method, header};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;

/// Where unauthenticated visitors of a protected page are sent.
pub const VERIFY_PATH: &str = "/verify";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
    /// Not listed anywhere. Allowed through; handlers do their own checks.
    Unclassified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Redirect(&'static str),
}

/// Static route visibility table consulted by the gate.
#[derive(Debug, Clone)]
pub struct RouteTable {
    protected_exact: Vec<&'static str>,
    public_exact: Vec<&'static str>,
    public_prefixes: Vec<&'static str>,
}

impl RouteTable {
    pub fn standard() -> Self {
        Self {
            protected_exact: vec!["/dashboard"],
            public_exact: vec!["/", "/verify", "/about-you", "/your-type", "/youre-all-set"],
            // API handlers check the session themselves
            public_prefixes: vec!["/api", "/static", "/favicon", "/swagger-ui"],
        }
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.protected_exact.contains(&path) {
            return RouteClass::Protected;
        }
        if self.public_exact.contains(&path)
            || self
                .public_prefixes
                .iter()
                .any(|&prefix| path.starts_with(prefix))
        {
            return RouteClass::Public;
        }
        RouteClass::Unclassified
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn decide(class: RouteClass, session: Option<&SessionCredential>) -> GateDecision {
    match (class, session) {
        (RouteClass::Protected, None) => GateDecision::Redirect(VERIFY_PATH),
        _ => GateDecision::Proceed,
    }
}

/// Decodes the `session` cookie once per request, stores the credential in
/// the request extensions and redirects anonymous visitors of protected pages.
pub struct SessionGate {
    jwt_service: JwtService,
    routes: Rc<RouteTable>,
}

impl SessionGate {
    pub fn new(jwt_service: JwtService) -> Self {
        Self::with_routes(jwt_service, RouteTable::standard())
    }

    pub fn with_routes(jwt_service: JwtService, routes: RouteTable) -> Self {
        Self {
            jwt_service,
            routes: Rc::new(routes),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGateService {
            service,
            jwt_service: self.jwt_service.clone(),
            routes: self.routes.clone(),
        }))
    }
}

pub struct SessionGateService<S> {
    service: S,
    jwt_service: JwtService,
    routes: Rc<RouteTable>,
}

impl<S, B> Service<ServiceRequest> for SessionGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let session = req
            .cookie(SESSION_COOKIE)
            .and_then(|cookie| self.jwt_service.verify(cookie.value()));
        let class = self.routes.classify(req.path());

        match decide(class, session.as_ref()) {
            GateDecision::Redirect(location) => {
                log::info!("Redirecting anonymous request for {} to {}", req.path(), location);
                let response = HttpResponse::TemporaryRedirect()
                    .insert_header((header::LOCATION, location))
                    .finish()
                    .map_into_right_body();
                Box::pin(async move { Ok(req.into_response(response)) })
            }
            GateDecision::Proceed => {
                if let Some(session) = session {
                    req.extensions_mut().insert(session);
                }
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
        }
    }
}

/// The signed-in caller of an API handler. Rejects with 401 when the request
/// carries no valid session.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionCredential);

impl CurrentSession {
    fn resolve(req: &HttpRequest) -> Option<SessionCredential> {
        if let Some(session) = req.extensions().get::<SessionCredential>() {
            return Some(session.clone());
        }
        // outside the gate, e.g. in handler tests
        let jwt_service = req.app_data::<web::Data<JwtService>>()?;
        let cookie = req.cookie(SESSION_COOKIE)?;
        jwt_service.verify(cookie.value())
    }
}

impl FromRequest for CurrentSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            Self::resolve(req)
                .map(CurrentSession)
                .ok_or_else(|| AppError::AuthError("Missing or invalid session".to_string())),
        )
    }
}
