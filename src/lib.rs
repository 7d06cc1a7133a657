// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup wiring
// - infrastructure: Postgres/Redis/S3/OCR/SMTP adapters
// - presentation: HTTP handlers, session guards and routing
// - application: ports, shared services and use cases
// - domain: core models and rules

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
