//! Provider contract tests.
//!
//! Every catalogued wrapper is driven over recorded-shape fixtures and must
//! honour the same contract: bare symbols, positive prices, request-ordered
//! quotes, consistent candles oldest first, limits respected and capped
//! comment threads.

use std::sync::Arc;

use cryptodesk_core::credentials::{
    BINANCE_API_KEY, BINANCE_API_SECRET, COINBASE_API_KEY, COINBASE_API_SECRET,
    CRYPTOCOMPARE_API_KEY, CRYPTOPANIC_API_KEY, NEWS_API_KEY, REDDIT_API_CLIENT_ID,
    REDDIT_API_CLIENT_SECRET,
};
use cryptodesk_core::{
    market_catalog, news_catalog, social_catalog, Credentials, FixtureHttpClient, MarketWrapper,
    NewsWrapper, SocialWrapper, Ticker, WrapperContext, MAX_COMMENTS,
};

const HISTORY_LIMIT: usize = 2;

fn market_fixture() -> FixtureHttpClient {
    FixtureHttpClient::new()
        // Binance
        .route(
            "ticker/24hr?symbol=BTCUSDT",
            r#"{"symbol":"BTCUSDT","lastPrice":"64000.10","volume":"1500.5"}"#,
        )
        .route(
            "ticker/24hr?symbols=",
            r#"[{"symbol":"ETHUSDT","lastPrice":"3000","volume":"9000"},
                {"symbol":"BTCUSDT","lastPrice":"64000.10","volume":"1500.5"}]"#,
        )
        .route(
            "/klines?symbol=BTCUSDT",
            r#"[[1700000000000,"100","110","95","105","12",0,"0",0,"0","0","0"],
                [1700003600000,"105","112","101","108","9",0,"0",0,"0","0","0"]]"#,
        )
        // Yahoo
        .route(
            "/chart/BTC-USD?interval=1h&range=1d",
            r#"{"chart":{"result":[{"meta":{"symbol":"BTC-USD","regularMarketPrice":64010.0,"regularMarketVolume":2000}}],"error":null}}"#,
        )
        .route(
            "/chart/ETH-USD?interval=1h&range=1d",
            r#"{"chart":{"result":[{"meta":{"symbol":"ETH-USD","regularMarketPrice":3001.0,"regularMarketVolume":5000}}],"error":null}}"#,
        )
        .route(
            "/chart/BTC-USD?interval=1h&range=5d",
            r#"{"chart":{"result":[{
                "meta":{"symbol":"BTC-USD"},
                "timestamp":[1699996400,1700000000,1700003600],
                "indicators":{"quote":[{
                    "open":[99,100,105],"high":[101,110,112],"low":[98,95,101],
                    "close":[100,105,108],"volume":[1,2,3]
                }]}
            }],"error":null}}"#,
        )
        // Coinbase
        .route(
            "brokerage/market/products/BTC-USD/candles",
            r#"{"candles":[
                {"start":"1700003600","low":"101","high":"112","open":"105","close":"108","volume":"7"},
                {"start":"1700000000","low":"95","high":"110","open":"100","close":"105","volume":"8"},
                {"start":"1699996400","low":"98","high":"101","open":"99","close":"100","volume":"9"}
            ]}"#,
        )
        .route(
            "brokerage/market/products/BTC-USD",
            r#"{"product_id":"BTC-USD","price":"64005.5","volume_24h":"800"}"#,
        )
        .route(
            "brokerage/market/products?product_ids=",
            r#"{"products":[
                {"product_id":"ETH-USD","price":"2999.5","volume_24h":"4000"},
                {"product_id":"BTC-USD","price":"64005.5","volume_24h":"800"}
            ]}"#,
        )
        // CryptoCompare
        .route(
            "pricemultifull?fsyms=BTC&",
            r#"{"RAW":{"BTC":{"USD":{"PRICE":64001.0,"VOLUME24HOUR":321.0}}}}"#,
        )
        .route(
            "pricemultifull?fsyms=BTC,ETH",
            r#"{"RAW":{"BTC":{"USD":{"PRICE":64001.0,"VOLUME24HOUR":321.0}},
                       "ETH":{"USD":{"PRICE":3002.0,"VOLUME24HOUR":654.0}}}}"#,
        )
        .route(
            "v2/histohour?fsym=BTC",
            r#"{"Response":"Success","Data":{"Data":[
                {"time":1699996400,"open":99,"high":101,"low":98,"close":100,"volumefrom":1},
                {"time":1700000000,"open":100,"high":110,"low":95,"close":105,"volumefrom":2},
                {"time":1700003600,"open":105,"high":112,"low":101,"close":108,"volumefrom":3}
            ]}}"#,
        )
}

fn news_fixture() -> FixtureHttpClient {
    FixtureHttpClient::new()
        .route(
            "news.google.com/rss/search",
            r#"<rss><channel>
                <item><title>BTC climbs</title><link>https://g.test/1</link><pubDate>Mon, 11 Mar 2024 08:00:00 GMT</pubDate><source url="https://a.test">A</source></item>
                <item><title>ETH dips</title><link>https://g.test/2</link></item>
                <item><title>SOL flat</title><link>https://g.test/3</link></item>
            </channel></rss>"#,
        )
        .route("duckduckgo.com/?q=", r#"<script>vqd="4-123456789"</script>"#)
        .route(
            "duckduckgo.com/news.js",
            r#"{"results":[
                {"date":1700000000,"title":"<b>BTC</b> climbs","excerpt":"up","url":"https://d.test/1","source":"D"},
                {"date":1700000100,"title":"ETH dips","excerpt":"down","url":"https://d.test/2","source":"D"},
                {"title":"SOL flat","url":"https://d.test/3","source":"D"}
            ]}"#,
        )
        .route(
            "newsapi.org/v2/",
            r#"{"status":"ok","articles":[
                {"source":{"name":"N"},"title":"BTC climbs","url":"https://n.test/1","publishedAt":"2024-03-11T08:00:00Z"},
                {"source":{"name":"N"},"title":"ETH dips","url":"https://n.test/2"},
                {"source":{"name":"N"},"title":"SOL flat","url":"https://n.test/3"}
            ]}"#,
        )
        .route(
            "cryptopanic.com/api/developer/v2/posts/",
            r#"{"results":[
                {"title":"BTC climbs","published_at":"2024-03-11T08:00:00Z","url":"https://c.test/1","source":{"title":"C"}},
                {"title":"ETH dips","url":"https://c.test/2"},
                {"title":"SOL flat","url":"https://c.test/3"}
            ]}"#,
        )
}

fn social_fixture() -> FixtureHttpClient {
    let replies = (1..=7)
        .map(|index| format!(r#"{{"time":{},"com":"reply {index}"}}"#, 1_700_000_000 + index))
        .collect::<Vec<_>>()
        .join(",");
    let comments = (1..=7)
        .map(|index| {
            format!(
                r#"{{"kind":"t1","data":{{"body":"comment {index}","created_utc":{}.0}}}}"#,
                1_700_000_000 + index
            )
        })
        .collect::<Vec<_>>()
        .join(",");

    FixtureHttpClient::new()
        .route(
            "/api/v1/access_token",
            r#"{"access_token":"tok","token_type":"bearer"}"#,
        )
        .route(
            "/comments/",
            format!(
                r#"[{{"kind":"Listing","data":{{"children":[]}}}},
                    {{"kind":"Listing","data":{{"children":[{comments}]}}}}]"#
            ),
        )
        .route(
            "/top?t=week",
            r#"{"kind":"Listing","data":{"children":[
                {"kind":"t3","data":{"id":"a1","title":"BTC halving","selftext":"soon","created_utc":1700000000.0}},
                {"kind":"t3","data":{"id":"b2","title":"ETH merge","selftext":"done","created_utc":1700000100.0}},
                {"kind":"t3","data":{"id":"c3","title":"SOL speed","selftext":"fast","created_utc":1700000200.0}}
            ]}}"#,
        )
        .route(
            "/biz/catalog.json",
            format!(
                r#"[{{"page":1,"threads":[
                    {{"no":1,"time":1700000000,"sub":"BTC general","com":"wagmi","replies":30,"last_replies":[{replies}]}},
                    {{"no":2,"time":1700000100,"sub":"ETH general","com":"gm","replies":20,"last_replies":[{replies}]}},
                    {{"no":3,"time":1700000200,"sub":"SOL general","com":"fast","replies":10}}
                ]}}]"#
            ),
        )
}

fn context(http: FixtureHttpClient) -> WrapperContext {
    let credentials = Credentials::from_pairs([
        (BINANCE_API_KEY, "k"),
        (BINANCE_API_SECRET, "s"),
        (COINBASE_API_KEY, "k"),
        (COINBASE_API_SECRET, "s"),
        (CRYPTOCOMPARE_API_KEY, "k"),
        (NEWS_API_KEY, "k"),
        (CRYPTOPANIC_API_KEY, "k"),
        (REDDIT_API_CLIENT_ID, "id"),
        (REDDIT_API_CLIENT_SECRET, "secret"),
    ]);
    WrapperContext::new(credentials, "USD", Arc::new(http))
}

fn market_wrappers() -> Vec<Box<dyn MarketWrapper>> {
    let context = context(market_fixture());
    market_catalog()
        .into_iter()
        .map(|factory| (factory.build)(&context).expect("credentials are present"))
        .collect()
}

fn news_wrappers() -> Vec<Box<dyn NewsWrapper>> {
    let context = context(news_fixture());
    news_catalog()
        .into_iter()
        .map(|factory| (factory.build)(&context).expect("credentials are present"))
        .collect()
}

// X needs the external rettiwt CLI, so the contract covers the HTTP-backed
// social wrappers only.
fn social_wrappers() -> Vec<Box<dyn SocialWrapper>> {
    let context = context(social_fixture());
    social_catalog()
        .into_iter()
        .filter(|factory| factory.name != "XWrapper")
        .map(|factory| (factory.build)(&context).expect("credentials are present"))
        .collect()
}

fn ticker(symbol: &str) -> Ticker {
    Ticker::parse(symbol).expect("valid ticker")
}

#[test]
fn catalogs_list_wrappers_in_default_order() {
    let market = market_catalog().iter().map(|factory| factory.name).collect::<Vec<_>>();
    let news = news_catalog().iter().map(|factory| factory.name).collect::<Vec<_>>();
    let social = social_catalog().iter().map(|factory| factory.name).collect::<Vec<_>>();

    assert_eq!(
        market,
        vec!["BinanceWrapper", "YFinanceWrapper", "CoinBaseWrapper", "CryptoCompareWrapper"]
    );
    assert_eq!(
        news,
        vec!["GoogleNewsWrapper", "DuckDuckGoWrapper", "NewsApiWrapper", "CryptoPanicWrapper"]
    );
    assert_eq!(social, vec!["RedditWrapper", "XWrapper", "ChanWrapper"]);
}

#[test]
fn every_market_wrapper_returns_a_bare_symbol_and_positive_price() {
    for wrapper in market_wrappers() {
        let quote = wrapper
            .get_product(&ticker("btc"))
            .unwrap_or_else(|error| panic!("{}: {error}", wrapper.name()));

        assert_eq!(quote.symbol.as_str(), "BTC", "{}", wrapper.name());
        assert!(quote.price > 0.0, "{}", wrapper.name());
        assert!(quote.volume_24h >= 0.0, "{}", wrapper.name());
        assert!(!quote.currency.is_empty(), "{}", wrapper.name());
        assert_eq!(quote.provider, wrapper.name());
    }
}

#[test]
fn every_market_wrapper_answers_in_request_order() {
    let assets = [ticker("BTC"), ticker("ETH")];

    for wrapper in market_wrappers() {
        let quotes = wrapper
            .get_products(&assets)
            .unwrap_or_else(|error| panic!("{}: {error}", wrapper.name()));

        let symbols = quotes
            .iter()
            .map(|quote| quote.symbol.as_str())
            .collect::<Vec<_>>();
        assert_eq!(symbols, vec!["BTC", "ETH"], "{}", wrapper.name());
    }
}

#[test]
fn every_market_wrapper_returns_consistent_candles_oldest_first() {
    for wrapper in market_wrappers() {
        let candles = wrapper
            .get_historical_prices(&ticker("BTC"), HISTORY_LIMIT)
            .unwrap_or_else(|error| panic!("{}: {error}", wrapper.name()));

        assert_eq!(candles.len(), HISTORY_LIMIT, "{}", wrapper.name());
        for candle in &candles {
            assert!(candle.is_consistent(), "{}: {candle:?}", wrapper.name());
            assert_eq!(candle.timestamp.len(), "YYYY-MM-DD HH:MM".len());
        }
        assert!(
            candles.windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp),
            "{} candles are not oldest first",
            wrapper.name()
        );
    }
}

#[test]
fn every_news_wrapper_respects_the_limit() {
    for wrapper in news_wrappers() {
        let articles = wrapper
            .get_top_headlines(2)
            .unwrap_or_else(|error| panic!("{}: {error}", wrapper.name()));

        assert_eq!(articles.len(), 2, "{}", wrapper.name());
        assert_eq!(articles[0].title, "BTC climbs", "{}", wrapper.name());
        assert!(!articles[0].url.is_empty(), "{}", wrapper.name());
    }
}

#[test]
fn every_news_wrapper_answers_free_text_queries() {
    for wrapper in news_wrappers() {
        let articles = wrapper
            .get_latest_news("bitcoin halving", 3)
            .unwrap_or_else(|error| panic!("{}: {error}", wrapper.name()));

        assert!(articles.len() <= 3, "{}", wrapper.name());
        assert!(
            articles.iter().all(|article| !article.title.contains('<')),
            "{} leaks markup",
            wrapper.name()
        );
    }
}

#[test]
fn every_social_wrapper_respects_the_limit_and_comment_cap() {
    let wrappers = social_wrappers();
    let names = wrappers.iter().map(|wrapper| wrapper.name()).collect::<Vec<_>>();
    assert_eq!(names, vec!["RedditWrapper", "ChanWrapper"]);

    for wrapper in wrappers {
        let posts = wrapper
            .get_top_crypto_posts(2)
            .unwrap_or_else(|error| panic!("{}: {error}", wrapper.name()));

        assert_eq!(posts.len(), 2, "{}", wrapper.name());
        for post in &posts {
            assert!(!post.title.is_empty(), "{}", wrapper.name());
            assert_eq!(post.time.len(), "YYYY-MM-DD HH:MM".len());
            assert_eq!(post.comments().len(), MAX_COMMENTS, "{}", wrapper.name());
        }
    }
}
