use crate::*;

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const CHAIR_BODY: &str = r#"[
    {"id": 1, "title": "Chair", "price": 49.9},
    {"id": 2, "title": "Table", "price": 199.0}
]"#;

#[derive(Default)]
struct FakeSource {
    responses: Mutex<VecDeque<Result<Vec<RawProduct>, SearchError>>>,
    queries: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl FakeSource {
    fn with_responses(
        responses: impl IntoIterator<Item = Result<Vec<RawProduct>, SearchError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ProductSource for FakeSource {
    async fn search(&self, query: &str) -> Result<Vec<RawProduct>, SearchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.queries.lock().unwrap().push(query.to_string());
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn session(source: Arc<FakeSource>) -> SearchSession {
    SearchSession::new(source, Arc::new(CurrencyFormat::brl()))
}

fn raw(id: u64, title: &str, cents: i64) -> RawProduct {
    RawProduct {
        id: ProductId(id),
        title: title.to_string(),
        price: Decimal::new(cents, 2),
    }
}

fn products(n: usize) -> Vec<Product> {
    let brl = CurrencyFormat::brl();
    (0..n)
        .map(|i| Product::from_raw(&raw(i as u64, &format!("Item {i}"), i as i64 * 100 + 99), &brl))
        .collect()
}

fn recording_callback() -> (WishlistCallback, Arc<Mutex<Vec<ProductId>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let cb = WishlistCallback::new({
        let calls = Arc::clone(&calls);
        move |id| calls.lock().unwrap().push(id)
    });
    (cb, calls)
}

fn results_view(row_count: usize) -> ResultsView {
    ResultsView::new(
        ViewportConfig::default().window_options(row_count),
        ConfirmationLoader::new(),
    )
}

#[tokio::test]
async fn chair_query_maps_rows_and_total() {
    let source = FakeSource::with_responses([decode_products(CHAIR_BODY)]);
    let mut s = session(Arc::clone(&source));

    assert_eq!(s.submit("chair").await, Some(Completion::Applied { rows: 2 }));
    assert_eq!(source.queries.lock().unwrap().as_slice(), ["chair"]);

    let results = s.results();
    assert_eq!(results.total_price(), Decimal::new(2489, 1));
    let rows = results.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, ProductId(1));
    assert_eq!(rows[0].title, "Chair");
    assert_eq!(rows[0].price_formatted, "R$ 49,90");
    assert_eq!(rows[1].id, ProductId(2));
    assert_eq!(rows[1].price_formatted, "R$ 199,00");
    assert!(s.last_error().is_none());
}

#[tokio::test]
async fn blank_query_is_ignored_without_fetching() {
    let source = FakeSource::with_responses([decode_products(CHAIR_BODY)]);
    let mut s = session(Arc::clone(&source));
    s.submit("chair").await;
    let before = s.results().clone();

    assert_eq!(s.submit("").await, None);
    assert_eq!(s.submit(" \t\n ").await, None);
    assert_eq!(source.calls(), 1);
    assert_eq!(s.results(), &before);
    assert!(!s.is_pending());
}

#[tokio::test]
async fn query_text_is_trimmed_before_fetching() {
    let source = FakeSource::with_responses([Ok(Vec::new())]);
    let mut s = session(Arc::clone(&source));
    s.submit("  mesa ").await;
    assert_eq!(source.queries.lock().unwrap().as_slice(), ["mesa"]);
}

#[test]
fn total_price_is_independent_of_row_order() {
    let brl = CurrencyFormat::brl();
    let mut items = vec![
        raw(1, "a", 1),
        raw(2, "b", 99_999),
        raw(3, "c", 3_333),
        raw(4, "d", 10),
        raw(5, "e", 4_990),
    ];
    let forward = ResultSet::from_raw(&items, &brl).unwrap();
    items.reverse();
    let backward = ResultSet::from_raw(&items, &brl).unwrap();

    assert_eq!(forward.total_price(), Decimal::new(108_333, 2));
    assert_eq!(forward.total_price(), backward.total_price());
    assert_eq!(backward.rows()[0].id, ProductId(5));
}

#[test]
fn empty_result_set_has_zero_total() {
    let set = ResultSet::from_raw(&[], &CurrencyFormat::brl()).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.total_price(), Decimal::ZERO);
    assert_eq!(set, ResultSet::empty());
}

#[tokio::test]
async fn failed_fetch_keeps_previous_results() {
    let source = FakeSource::with_responses([
        decode_products(CHAIR_BODY),
        Err(SearchError::status(503)),
        decode_products(r#"{"unexpected": true}"#),
        Ok(vec![raw(9, "Lamp", 1_500)]),
    ]);
    let mut s = session(source);

    s.submit("chair").await;
    let chairs = s.results().clone();

    assert_eq!(s.submit("chair").await, Some(Completion::Failed));
    assert_eq!(s.results(), &chairs);
    assert_eq!(s.last_error().and_then(SearchError::status_code), Some(503));
    assert!(s.last_error().is_some_and(SearchError::is_retryable));

    assert_eq!(s.submit("chair").await, Some(Completion::Failed));
    assert_eq!(s.results(), &chairs);
    assert!(matches!(s.last_error(), Some(SearchError::Malformed { body: Some(_), .. })));

    assert_eq!(s.submit("lamp").await, Some(Completion::Applied { rows: 1 }));
    assert!(s.last_error().is_none());
    assert_eq!(s.results().total_price(), Decimal::new(15, 0));
}

#[test]
fn stale_responses_are_discarded() {
    let mut s = session(FakeSource::with_responses(Vec::new()));
    let first = s.begin("chair").unwrap();
    let second = s.begin("table").unwrap();
    assert!(second.seq() > first.seq());
    assert!(s.is_pending());

    // The older request resolves last: it must not overwrite the newer results.
    assert_eq!(
        s.complete(&second, Ok(vec![raw(2, "Table", 19_900)])),
        Completion::Applied { rows: 1 }
    );
    assert_eq!(
        s.complete(&first, Ok(vec![raw(1, "Chair", 4_990)])),
        Completion::Stale
    );
    assert_eq!(s.results().rows()[0].title, "Table");
    assert!(!s.is_pending());

    // A failure of a superseded request is ignored too.
    let third = s.begin("lamp").unwrap();
    let fourth = s.begin("sofa").unwrap();
    assert_eq!(s.complete(&third, Err(SearchError::status(500))), Completion::Stale);
    assert!(s.last_error().is_none());
    assert_eq!(s.complete(&fourth, Ok(Vec::new())), Completion::Applied { rows: 0 });
}

#[tokio::test]
async fn wishlist_callback_identity_is_stable_for_the_session() {
    let source = FakeSource::with_responses([decode_products(CHAIR_BODY), Ok(Vec::new())]);
    let mut s = session(source);
    let before = s.on_add_to_wishlist().clone();

    s.submit("chair").await;
    s.submit("table").await;
    assert!(s.on_add_to_wishlist().ptr_eq(&before));

    let (other, _) = recording_callback();
    assert!(!other.ptr_eq(&before));
}

#[test]
fn memo_row_skips_value_equal_products_with_a_new_callback() {
    let rows = products(3);
    let (cb_a, _) = recording_callback();
    let (cb_b, _) = recording_callback();
    let mut row = MemoRow::mount(&rows[1], &cb_a, ConfirmationLoader::new());
    assert_eq!(row.render_count(), 1);

    // A freshly built, value-identical product and a different callback.
    let rebuilt = Product::from_raw(&raw(1, "Item 1", 199), &CurrencyFormat::brl());
    let view = row.render(&rebuilt, &cb_b).clone();
    assert_eq!(row.render_count(), 1);
    assert_eq!(row.skip_count(), 1);
    assert_eq!(view.summary(), "Item 1 - R$ 1,99");

    let mut changed = rebuilt.clone();
    changed.title = "Item 1 (promo)".to_string();
    row.render(&changed, &cb_b);
    assert_eq!(row.render_count(), 2);
    assert_eq!(row.view().title, "Item 1 (promo)");

    // Equal price value with a different formatted string is a different row.
    let mut reformatted = changed.clone();
    reformatted.price_formatted = "$1.99".to_string();
    assert!(!changed.is_equivalent(&reformatted));
    row.render(&reformatted, &cb_b);
    assert_eq!(row.render_count(), 3);
}

#[test]
fn results_view_renders_only_the_window() {
    let rows = products(10_000);
    let (cb, _) = recording_callback();
    let mut view = results_view(rows.len());

    let rendered = view.render(&rows, &cb);
    let indexes: Vec<usize> = rendered.iter().map(|r| r.index).collect();
    assert_eq!(indexes, (0..15).collect::<Vec<_>>());

    view.scroll_to(3000);
    let rendered = view.render(&rows, &cb);
    assert_eq!(rendered.len(), 20);
    assert_eq!(rendered.first().map(|r| r.index), Some(95));
    assert_eq!(rendered.last().map(|r| r.index), Some(114));
    assert_eq!(rendered[0].start, 95 * 30);

    let slots: BTreeSet<usize> = rendered.iter().map(|r| r.slot).collect();
    assert_eq!(slots.len(), rendered.len());
    assert_eq!(view.mounted_len(), 20);
    assert!(view.row(0).is_none());
    assert!(view.slot_capacity() <= 21);

    let spacers = view.spacers();
    assert_eq!(spacers.before, 95 * 30);
    assert_eq!(spacers.before + 20 * 30 + spacers.after, view.total_height());
}

#[test]
fn rebuilt_rows_with_equal_values_do_not_rerender() {
    let rows = products(200);
    let (cb, _) = recording_callback();
    let mut view = results_view(rows.len());
    view.render(&rows, &cb);

    // The parent re-renders: new row vector, new callback, same values.
    let rebuilt: Vec<Product> = rows.iter().cloned().collect();
    let (new_cb, _) = recording_callback();
    view.render(&rebuilt, &new_cb);
    for index in view.materialized_range().indexes() {
        let row = view.row(index).unwrap();
        assert_eq!(row.render_count(), 1, "row {index}");
        assert_eq!(row.skip_count(), 1, "row {index}");
    }

    // Changing a single product re-renders that row only.
    let mut edited = rebuilt.clone();
    edited[3].price = Decimal::new(1, 0);
    edited[3].price_formatted = "R$ 1,00".to_string();
    view.render(&edited, &new_cb);
    for index in view.materialized_range().indexes() {
        let expected = if index == 3 { 2 } else { 1 };
        assert_eq!(view.row(index).unwrap().render_count(), expected, "row {index}");
    }
}

#[test]
fn empty_results_render_an_empty_list() {
    let (cb, _) = recording_callback();
    let mut view = results_view(0);
    assert!(view.render(&[], &cb).is_empty());
    assert_eq!(view.total_height(), 0);
    assert_eq!(view.spacers(), Spacers::default());

    // Shrinking from a populated list unmounts everything.
    let rows = products(50);
    view.render(&rows, &cb);
    assert_eq!(view.mounted_len(), 15);
    assert!(view.render(&[], &cb).is_empty());
    assert_eq!(view.mounted_len(), 0);
}

#[test]
fn declining_the_prompt_never_invokes_the_callback() {
    let brl = CurrencyFormat::brl();
    let rows: Vec<Product> = [raw(1, "Chair", 4_990), raw(2, "Table", 19_900)]
        .iter()
        .map(|r| Product::from_raw(r, &brl))
        .collect();
    let (cb, calls) = recording_callback();
    let mut view = results_view(rows.len());
    view.render(&rows, &cb);

    assert_eq!(view.prompt_state(1), Some(PromptState::Idle));
    assert!(view.open_prompt(1));
    assert!(!view.open_prompt(1));
    assert_eq!(view.prompt_state(1), Some(PromptState::Prompting));
    assert_eq!(view.prompt_state(0), Some(PromptState::Idle));
    assert_eq!(view.open_prompt_index(), Some(1));

    assert!(view.decline(1));
    assert_eq!(view.prompt_state(1), Some(PromptState::Idle));
    assert!(calls.lock().unwrap().is_empty());

    assert!(view.open_prompt(1));
    assert!(view.confirm(1));
    assert!(!view.confirm(1));
    assert_eq!(view.prompt_state(1), Some(PromptState::Idle));
    assert_eq!(calls.lock().unwrap().as_slice(), [ProductId(2)]);

    assert!(!view.dismiss(1));
    assert!(!view.open_prompt(7));
}

#[test]
fn prompt_machine_transitions() {
    let (cb, calls) = recording_callback();
    let mut prompt = WishlistPrompt::new();
    assert_eq!(prompt.state(), PromptState::Idle);
    assert!(!prompt.confirm(ProductId(2), &cb));
    assert!(!prompt.decline());

    assert!(prompt.open());
    assert!(prompt.is_open());
    assert!(prompt.dismiss());
    assert!(!prompt.is_open());

    assert!(prompt.open());
    assert!(prompt.confirm(ProductId(2), &cb));
    assert_eq!(calls.lock().unwrap().as_slice(), [ProductId(2)]);
}

#[tokio::test]
async fn confirming_reaches_the_session_wishlist() {
    let source = FakeSource::with_responses([decode_products(CHAIR_BODY)]);
    let mut s = session(source);
    s.submit("chair").await;

    let rows = s.results().shared_rows();
    let mut view = results_view(rows.len());
    view.render(&rows, s.on_add_to_wishlist());

    assert!(view.open_prompt(1));
    assert!(view.confirm(1));
    assert_eq!(s.drain_wishlist_requests(), [ProductId(2)]);
    assert!(s.is_wishlisted(ProductId(2)));
    assert!(!s.is_wishlisted(ProductId(1)));

    // Adding again is idempotent.
    assert!(view.open_prompt(1));
    assert!(view.confirm(1));
    assert!(s.drain_wishlist_requests().is_empty());
    assert_eq!(s.wishlisted().len(), 1);
}

#[test]
fn prompt_changes_rerender_only_their_row() {
    let rows = products(5);
    let (cb, _) = recording_callback();
    let mut view = results_view(rows.len());
    view.render(&rows, &cb);

    view.open_prompt(2);
    let rendered = view.render(&rows, &cb);
    assert_eq!(rendered[2].view.prompt, PromptView::Loading);
    assert_eq!(rendered[2].view.prompt_text().as_deref(), Some(LOADING_PLACEHOLDER));
    assert_eq!(rendered[1].view.prompt, PromptView::Closed);
    assert_eq!(view.row(2).unwrap().render_count(), 2);
    assert_eq!(view.row(1).unwrap().render_count(), 1);
}

#[tokio::test]
async fn loaded_confirmation_replaces_the_placeholder() {
    let rows = products(3);
    let (cb, _) = recording_callback();
    let loader = ConfirmationLoader::new();
    let mut view = ResultsView::new(
        ViewportConfig::default().window_options(rows.len()),
        loader.clone(),
    );
    view.render(&rows, &cb);
    view.open_prompt(0);
    view.render(&rows, &cb);
    assert_eq!(view.row(0).unwrap().view().prompt, PromptView::Loading);
    assert!(!loader.is_loaded());

    let copy = loader.load().await;
    assert_eq!(copy.confirm_label, "Sim");

    let rendered = view.render(&rows, &cb);
    assert_eq!(
        rendered[0].view.prompt_text().as_deref(),
        Some("Deseja adicionar aos favoritos? [Sim] [Não]")
    );
    assert_eq!(view.row(0).unwrap().render_count(), 3);

    view.render(&rows, &cb);
    assert_eq!(view.row(0).unwrap().render_count(), 3);
}

#[test]
fn scrolled_out_rows_lose_their_prompt() {
    let rows = products(1_000);
    let (cb, _) = recording_callback();
    let mut view = results_view(rows.len());
    view.render(&rows, &cb);
    assert!(view.open_prompt(0));

    let delta = view.scroll_to(10_000);
    assert!(delta.unmounted_count() > 0);
    assert_eq!(view.prompt_state(0), None);

    view.scroll_to(0);
    view.render(&rows, &cb);
    assert_eq!(view.prompt_state(0), Some(PromptState::Idle));
}

#[test]
fn brl_formatting() {
    let brl = CurrencyFormat::brl();
    assert_eq!(brl.format_price(Decimal::new(499, 1)), "R$ 49,90");
    assert_eq!(brl.format_price(Decimal::new(199, 0)), "R$ 199,00");
    assert_eq!(brl.format_price(Decimal::new(12345, 1)), "R$ 1.234,50");
    assert_eq!(brl.format_price(Decimal::new(100_000_000, 2)), "R$ 1.000.000,00");
    assert_eq!(brl.format_price(Decimal::ZERO), "R$ 0,00");
    assert_eq!(brl.format_price(Decimal::new(-1, 0)), "-R$ 1,00");
    assert_eq!(brl.format_price(Decimal::new(5, 3)), "R$ 0,01");
    assert_eq!(brl.format_price(Decimal::new(-1, 3)), "R$ 0,00");
}

#[test]
fn usd_formatting_and_locales() {
    let usd = CurrencyFormat::usd();
    assert_eq!(usd.format_price(Decimal::new(1_234_567_891, 3)), "$1,234,567.89");
    assert_eq!(
        usd.with_locale(Locale::PtBr).format_price(Decimal::new(5, 0)),
        "US$ 5,00"
    );
    assert_eq!(
        CurrencyFormat::brl()
            .with_min_fraction_digits(0)
            .format_price(Decimal::new(12345, 1)),
        "R$ 1.235"
    );
    assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::PtBr);
    assert!(matches!(
        "fr-FR".parse::<Locale>(),
        Err(ConfigError::UnknownLocale(_))
    ));
}

#[test]
fn decode_products_accepts_numbers_and_rejects_wrong_shapes() {
    let products = decode_products(CHAIR_BODY).unwrap();
    assert_eq!(products[0], raw(1, "Chair", 4_990));
    assert_eq!(products[1].price, Decimal::new(199, 0));

    let err = decode_products(r#"[{"id": 1, "title": "Chair"}]"#).unwrap_err();
    assert!(matches!(err, SearchError::Malformed { body: Some(_), .. }));
    assert!(!err.is_retryable());
    assert!(decode_products("not json").is_err());
    assert!(decode_products("[]").unwrap().is_empty());
}

#[test]
fn http_source_encodes_the_query() {
    let source = HttpProductSource::new("http://localhost:3333/products").unwrap();
    assert_eq!(
        source.query_url("mesa azul & cia").as_str(),
        "http://localhost:3333/products?q=mesa+azul+%26+cia"
    );

    let source = HttpProductSource::new("http://localhost:3333/products?limit=10").unwrap();
    assert_eq!(
        source.query_url("chair").as_str(),
        "http://localhost:3333/products?limit=10&q=chair"
    );

    assert!(matches!(
        HttpProductSource::new("not a url"),
        Err(SearchError::InvalidEndpoint(_))
    ));
}

#[test]
fn config_defaults_and_validation() {
    let config = VitrineConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.viewport, ViewportConfig { height: 300, row_height: 30, overscan: 5 });
    assert_eq!(config.currency, CurrencyFormat::brl());

    let bad = VitrineConfig::default().with_endpoint("ftp://example.com/products");
    assert!(matches!(bad.validate(), Err(ConfigError::UnsupportedScheme(_))));

    let bad = VitrineConfig::default().with_endpoint("::");
    assert!(matches!(bad.validate(), Err(ConfigError::InvalidEndpoint { .. })));

    let bad = VitrineConfig::default().with_viewport(ViewportConfig {
        row_height: 0,
        ..ViewportConfig::default()
    });
    assert!(matches!(bad.validate(), Err(ConfigError::ZeroRowHeight)));
}

#[test]
fn config_deserializes_with_defaults() {
    let config: VitrineConfig = serde_json::from_str(
        r#"{
            "endpoint": "https://shop.example/products",
            "currency": {"locale": "en-US", "currency": "USD", "min_fraction_digits": 2},
            "viewport": {"overscan": 2}
        }"#,
    )
    .unwrap();
    assert_eq!(config.currency, CurrencyFormat::usd());
    assert_eq!(config.viewport.overscan, 2);
    assert_eq!(config.viewport.row_height, 30);
    assert_eq!(config.request_timeout_ms, Some(10_000));
    assert!(config.endpoint_url().is_ok());
}

#[test]
fn a_new_product_on_the_row_closes_its_prompt() {
    let brl = CurrencyFormat::brl();
    let chair = Product::from_raw(&raw(1, "Chair", 4_990), &brl);
    let lamp = Product::from_raw(&raw(3, "Lamp", 1_500), &brl);
    let (cb, calls) = recording_callback();

    let mut row = MemoRow::mount(&chair, &cb, ConfirmationLoader::new());
    assert!(row.open_prompt());
    let view = row.render(&lamp, &cb).clone();
    assert_eq!(row.prompt_state(), PromptState::Idle);
    assert_eq!(view.prompt, PromptView::Closed);
    assert_eq!(view.title, "Lamp");
    assert!(!row.confirm());
    assert!(calls.lock().unwrap().is_empty());

    // The same product keeps its prompt across renders.
    assert!(row.open_prompt());
    row.render(&lamp, &cb);
    assert_eq!(row.prompt_state(), PromptState::Prompting);
}

#[test]
fn replacing_rows_drops_open_prompts() {
    let brl = CurrencyFormat::brl();
    let first: Vec<Product> = [raw(1, "Chair", 4_990), raw(2, "Table", 19_900)]
        .iter()
        .map(|r| Product::from_raw(r, &brl))
        .collect();
    // Same id at the same index, different product data.
    let second: Vec<Product> = (1..=50)
        .map(|id| Product::from_raw(&raw(id, &format!("Item {id}"), 1_000), &brl))
        .collect();
    let (cb, calls) = recording_callback();
    let mut view = results_view(first.len());
    view.render(&first, &cb);
    assert!(view.open_prompt(1));

    view.replace_rows(second.len());
    let rendered = view.render(&second, &cb);
    assert_eq!(rendered[1].view.title, "Item 2");
    assert_eq!(rendered[1].view.prompt, PromptView::Closed);
    assert_eq!(view.prompt_state(1), Some(PromptState::Idle));
    assert_eq!(view.open_prompt_index(), None);
    assert_eq!(view.viewport_state().scroll_offset, 0);
    assert!(calls.lock().unwrap().is_empty());
}

/// Serves one canned `(status, body)` response per connection and reports each request line.
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = String::from_utf8_lossy(&request);
            let line = head.lines().next().unwrap_or_default().to_string();
            request_tx.send(line).unwrap();

            let reason = if status == 200 { "OK" } else { "Service Unavailable" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        }
    });
    (format!("http://{addr}/products"), request_rx)
}

#[tokio::test]
async fn http_source_maps_status_and_body() {
    let (endpoint, mut requests) =
        serve(vec![(503, "down"), (200, CHAIR_BODY), (200, "{\"oops\": 1}")]).await;
    let source = HttpProductSource::new(&endpoint).unwrap();

    let err = source.search("chair").await.unwrap_err();
    assert!(
        matches!(&err, SearchError::Status { status: 503, body: Some(body) } if body == "down"),
        "{err:?}"
    );
    assert!(err.is_retryable());
    assert_eq!(requests.recv().await.unwrap(), "GET /products?q=chair HTTP/1.1");

    let products = source.search("mesa azul").await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[1].price, Decimal::new(199, 0));
    assert_eq!(requests.recv().await.unwrap(), "GET /products?q=mesa+azul HTTP/1.1");
    let set = ResultSet::from_raw(&products, &CurrencyFormat::brl()).unwrap();
    assert_eq!(set.total_price(), Decimal::new(2489, 1));

    let err = source.search("chair").await.unwrap_err();
    assert!(matches!(err, SearchError::Malformed { body: Some(_), .. }), "{err:?}");
}

#[tokio::test]
async fn session_over_http_keeps_rows_when_the_server_fails() {
    let (endpoint, _requests) = serve(vec![(200, CHAIR_BODY), (503, "down")]).await;
    let source = HttpProductSource::new(&endpoint).unwrap();
    let mut s = SearchSession::new(Arc::new(source), Arc::new(CurrencyFormat::brl()));

    assert_eq!(s.submit("chair").await, Some(Completion::Applied { rows: 2 }));
    assert_eq!(s.submit("chair").await, Some(Completion::Failed));
    assert_eq!(s.results().len(), 2);
    assert_eq!(s.last_error().and_then(SearchError::status_code), Some(503));
}
