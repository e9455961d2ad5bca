//! Web application: routing, request handlers and HTML assembly.

use crate::app_state::{AppState, SharedAppState};
use crate::error::PanelError;
use crate::metrics;
use crate::models::{CorrelationParams, Field};
use crate::render;
use crate::stats;

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

/// The axum service type, with trailing slashes normalized away.
pub type Service = NormalizePath<Router>;

/// Returns the application [Router].
pub fn router(state: SharedAppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/correlation", get(correlation))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics::metrics_handler))
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .on_request(metrics::request_counter)
                    .on_response(metrics::record_response_metrics),
            ),
        )
        .with_state(state)
}

/// Returns the application [Service].
pub fn service(state: SharedAppState) -> Service {
    NormalizePath::trim_trailing_slash(router(state))
}

/// Liveness probe.
async fn healthz() -> &'static str {
    "OK"
}

/// Index page: one fitted histogram per measurement field plus the
/// variable-selection form for correlation analysis.
async fn index(State(state): State<SharedAppState>) -> Result<Html<String>, PanelError> {
    let since = state.args.start_date;
    let mut sections = String::new();
    for field in Field::ALL {
        let values = state.datastore.fetch_series(field, since).await?;
        let fit = stats::fit_normal(&values)?;
        let png = render_blocking(&state, "histogram", move || {
            render::render_histogram(field.column(), &values, &fit)
        })
        .await?;
        sections.push_str(&histogram_section(field, &base64::encode(&png)));
    }
    Ok(Html(index_page(&sections)))
}

/// Correlation page: scatter of two standardized fields with the fitted line.
async fn correlation(
    State(state): State<SharedAppState>,
    Query(params): Query<CorrelationParams>,
) -> Result<Html<String>, PanelError> {
    let (var1, var2) = match (params.var1.as_deref(), params.var2.as_deref()) {
        (Some(var1), Some(var2)) => (var1, var2),
        _ => return Err(PanelError::NoVariablesSelected),
    };
    // Reject unknown names before any query is built.
    let x: Field = var1.parse()?;
    let y: Field = var2.parse()?;

    let (xs, ys) = state.datastore.fetch_pairs(x, y, state.args.start_date).await?;
    let pair = stats::standardize_and_fit(&xs, &ys)?;
    let png = render_blocking(&state, "scatter", move || {
        render::render_scatter_fit(x.column(), y.column(), &pair)
    })
    .await?;
    Ok(Html(correlation_page(x, y, &base64::encode(&png))))
}

/// Run a rendering closure on the blocking thread pool.
///
/// A rendering permit is held until the task completes, bounding the number
/// of pixel buffers alive at once.
async fn render_blocking<F>(
    state: &AppState,
    chart_kind: &'static str,
    render: F,
) -> Result<Vec<u8>, PanelError>
where
    F: FnOnce() -> Result<Vec<u8>, PanelError> + Send + 'static,
{
    let _permit = state.resource_manager.render_task().await?;
    let start = std::time::Instant::now();
    let png = tokio::task::spawn_blocking(render).await??;
    metrics::record_chart_render_time(chart_kind, start.elapsed());
    Ok(png)
}

/// One histogram heading and inline image on the index page.
fn histogram_section(field: Field, image_base64: &str) -> String {
    format!(
        r#"    <h2>Histograma de {field}</h2>
    <img src="data:image/png;base64,{image_base64}" alt="Histograma de {field}">
"#
    )
}

/// Assemble the index page from rendered histogram sections.
fn index_page(sections: &str) -> String {
    let options: String = Field::ALL
        .iter()
        .map(|field| format!(r#"        <option value="{field}">{field}</option>"#))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Histogramas con Ajuste Gaussiano</title>
  </head>
  <body>
    <h1>Histogramas con Ajuste Gaussiano</h1>
{sections}
    <h1>Correlación de Pearson</h1>
    <form action="/correlation" method="get">
      <label for="var1">Selecciona la primera variable:</label>
      <select id="var1" name="var1">
{options}
      </select>

      <label for="var2">Selecciona la segunda variable:</label>
      <select id="var2" name="var2">
{options}
      </select>

      <button type="submit">Ver Correlación</button>
    </form>
  </body>
</html>
"#
    )
}

/// Assemble the correlation page around the rendered scatter image.
fn correlation_page(x: Field, y: Field, image_base64: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Correlación de Pearson</title>
  </head>
  <body>
    <h1>Correlación de Pearson entre {x} y {y}</h1>
    <img src="data:image/png;base64,{image_base64}" alt="Correlación de Pearson">
    <a href="/">Volver</a>
  </body>
</html>
"#
    )
}
