//! End-to-end tests for the light-mode pipeline against a local HTTP server.

use site_analyzer::domain::models::{Category, HttpsRating, Score, Section};
use site_analyzer::service::insights::{generate_insights, generate_recommendations};
use site_analyzer::service::performance::FALLBACK_SCORE;
use site_analyzer::service::scoring::score_card;
use site_analyzer::service::{ReportDocument, ReportKind};
use site_analyzer::{AnalysisFailure, AnalyzerConfig, AppError, AuditMode, SiteAnalyzer};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Home</title>
    <link rel="stylesheet" href="/css/site.css">
    <script src="/js/app.js"></script>
</head>
<body>
    <h1>Willkommen</h1>
    <h1>Noch eine Überschrift</h1>
    <p>Ein kurzer Absatz.</p>
    <img src="/a.png" alt="A">
    <img src="/b.png">
    <a href="/kontakt">Kontakt</a>
    <ul><li>Eins</li></ul>
</body>
</html>"#;

fn light_analyzer() -> SiteAnalyzer {
    let config = AnalyzerConfig {
        mode: AuditMode::Light,
        ..AnalyzerConfig::default()
    };
    SiteAnalyzer::new(config).expect("analyzer should build")
}

#[tokio::test]
async fn test_light_mode_analysis_of_local_page() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_header("x-frame-options", "SAMEORIGIN")
        .with_header("set-cookie", "sid=1; HttpOnly")
        .with_body(PAGE)
        .create_async()
        .await;

    let url = format!("{}/", server.url());
    let report = light_analyzer().analyze(&url).await.unwrap();
    mock.assert_async().await;

    assert_eq!(report.status_code, 200);

    let seo = report.seo.ready().unwrap();
    assert_eq!(seo.meta.title, "Home");
    assert_eq!(seo.meta.title_length, 4);
    assert_eq!(seo.headings.h1, 2);
    assert_eq!(seo.images.total, 2);
    assert_eq!(seo.images.alt_percentage, 50);
    assert_eq!(seo.links.internal, 1);
    assert_eq!(seo.links.external, 0);

    let performance = report.performance.ready().unwrap();
    assert_eq!(performance.score, Score::Value(FALLBACK_SCORE));
    assert_eq!(performance.metrics.fcp.to_string(), "N/A");

    let security = report.security.ready().unwrap();
    assert!(!security.https.enabled);
    assert_eq!(security.https.score, HttpsRating::Poor);
    assert_eq!(security.security_headers.implemented, 1);
    assert_eq!(security.security_headers.missing, 5);
    assert_eq!(security.cookies.total, 1);

    let resources = report.statistics.resources.ready().unwrap();
    assert_eq!(resources.resources.total, 5);
    assert_eq!(resources.resources.by_type["image"].count, 2);
    assert_eq!(resources.load_time.to_string(), "N/A");
    assert!(report.statistics.dom_elements > 10);

    let scores = score_card(&report);
    assert_eq!(scores.performance, Score::Value(FALLBACK_SCORE));
    assert_eq!(scores.security, Score::Value(17));
}

#[tokio::test]
async fn test_weak_page_gets_rules_in_domain_order() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_body(PAGE)
        .create_async()
        .await;

    let report = light_analyzer()
        .analyze(&format!("{}/", server.url()))
        .await
        .unwrap();

    let insights = generate_insights(&report);
    let texts: Vec<&str> = insights.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts[0], "Der Seitentitel fehlt oder ist zu kurz für SEO.");
    assert_eq!(texts[1], "Die Meta-Beschreibung fehlt oder ist zu kurz für SEO.");
    assert!(texts.contains(&"Die Website verwendet kein HTTPS, was ein Sicherheitsrisiko darstellt."));

    let recommendations = generate_recommendations(&report);
    let headers = recommendations
        .iter()
        .find(|r| r.text.starts_with("Füge die fehlenden Sicherheits-Header"))
        .expect("missing headers should be recommended");
    assert_eq!(headers.details.len(), 6);

    let content = report.content.ready().unwrap();
    assert!(!content.responsive_design.viewport_meta);
    assert!(!content.responsive_design.media_queries);
    let mobile: Vec<&str> = recommendations
        .iter()
        .filter(|r| r.category == Category::Mobile)
        .map(|r| r.text.as_str())
        .collect();
    assert_eq!(mobile.len(), 2);
    assert!(mobile[0].contains("Viewport-Meta-Tag"));
}

#[tokio::test]
async fn test_text_report_for_local_page() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_body(PAGE)
        .create_async()
        .await;

    let report = light_analyzer()
        .analyze(&format!("{}/", server.url()))
        .await
        .unwrap();

    let text = ReportDocument::build(&report, ReportKind::Seo).to_text();
    assert!(text.contains("SEO-Analyse"));
    assert!(!text.contains("Sicherheitsanalyse"));
}

#[tokio::test]
async fn test_unreachable_host_fails_the_whole_report() {
    // port 9 (discard) on loopback is closed in test environments
    let err = light_analyzer()
        .analyze("http://127.0.0.1:9/")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NetworkError(_)));

    let failure = AnalysisFailure::from(err);
    assert_eq!(failure.error, "Fehler bei der Website-Analyse");
    let json = serde_json::to_value(&failure).unwrap();
    assert!(json["details"].as_str().unwrap().starts_with("Network error"));
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_fetching() {
    let err = light_analyzer().analyze("mailto:someone@example.com").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidUrl(_)));
}

#[tokio::test]
async fn test_report_json_shape() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_body(PAGE)
        .create_async()
        .await;

    let report = light_analyzer()
        .analyze(&format!("{}/", server.url()))
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["seo"]["meta"]["titleLength"], 4);
    assert_eq!(json["performance"]["score"], 50);
    assert_eq!(json["performance"]["metrics"]["LCP"], "N/A");
    assert!(json["security"]["securityHeaders"]["headers"]["Referrer-Policy"].is_null());
    assert_eq!(json["security"]["https"]["score"], "Schlecht");
    assert!(matches!(report.content, Section::Ready(_)));
}
