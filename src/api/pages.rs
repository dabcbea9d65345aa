// src/api/pages.rs

use crate::dashboard::{DiagramRequest, DiagramView, PredictionRequest, PredictionView};

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>body{{font-family:sans-serif;max-width:1540px;margin:2em auto;}}\
         table{{border-collapse:collapse;}}td,th{{border:1px solid #ccc;padding:2px 8px;text-align:right;}}\
         .notice{{padding:1em;background:#fff3cd;border:1px solid #ffe08a;}}</style>\n\
         </head>\n<body>\n<p><a href=\"/\">Back</a></p>\n<h1>{title}</h1>\n<hr>\n{body}\n</body>\n</html>\n",
        title = escape(title),
        body = body
    )
}

pub fn diagram_page(request: &DiagramRequest, view: &DiagramView) -> String {
    let mut body = String::new();
    let settings = if request.default_settings { "Default settings" } else { "Custom layers" };
    body.push_str(&format!("<p>{}: layer sizes {:?}</p>\n", settings, view.spec.sizes()));
    body.push_str(&view.svg);
    layout("Neural Network Architecture Diagram", &body)
}

pub fn prediction_page(request: &PredictionRequest, view: &PredictionView) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "<p>Symbol <b>{}</b>, {} to {}</p>\n",
        escape(&request.symbol),
        escape(&request.start),
        escape(&request.end)
    ));

    if let Some(chart) = &view.raw_chart {
        body.push_str(chart);
    }

    if let Some(notice) = &view.notice {
        body.push_str(&format!("<p class=\"notice\">{}</p>\n", escape(&notice.message)));
        return layout("Stock Price Predictor Web Application", &body);
    }

    body.push_str("<h2>Original values vs Predicted values</h2>\n<table>\n");
    body.push_str("<tr><th>Date</th><th>original_test_data</th><th>predictions</th></tr>\n");
    for record in &view.records {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{:.4}</td><td>{:.4}</td></tr>\n",
            record.date.format("%Y-%m-%d"),
            record.actual,
            record.predicted
        ));
    }
    body.push_str("</table>\n");

    body.push_str("<h2>Original Close Price vs Predicted Close price</h2>\n");
    if let Some(chart) = &view.combined_chart {
        body.push_str(chart);
    }
    layout("Stock Price Predictor Web Application", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Notice;

    #[test]
    fn user_text_is_escaped() {
        assert_eq!(escape("<a href='x'>&"), "&lt;a href=&#39;x&#39;&gt;&amp;");
    }

    #[test]
    fn notice_page_has_no_table() {
        let request = PredictionRequest {
            symbol: "<script>".to_string(),
            start: "2024-01-01".to_string(),
            end: "2024-06-01".to_string(),
        };
        let view = PredictionView {
            symbol: request.symbol.clone(),
            notice: Some(Notice {
                cause: "invalid_symbol",
                message: "Please check the Symbol name".to_string(),
            }),
            ..Default::default()
        };
        let page = prediction_page(&request, &view);
        assert!(page.contains("Please check the Symbol name"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<table>"));
        assert!(!page.contains("<svg"));
    }
}
