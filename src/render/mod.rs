//! Maps scan records to typed table rows.

use crate::data::{Coin, Numeric, Thresholds};
use crate::format::{
    RsiClass, chart_url, classify_rsi, format_market_cap, format_price, format_rsi,
};

pub const TIMEFRAMES: [&str; 4] = ["15m", "1h", "4h", "1D"];

#[derive(Clone, Debug, PartialEq)]
pub struct RsiCell {
    pub text: String,
    pub class: RsiClass,
}

/// Everything the table needs to draw one coin.
#[derive(Clone, Debug, PartialEq)]
pub struct RowView {
    pub symbol: String,
    pub chart_url: String,
    pub price: String,
    pub market_cap: String,
    pub rsi: [RsiCell; 4],
    /// Key handed to the removal control
    pub ticker: String,
}

impl RowView {
    pub fn from_coin(coin: &Coin, thresholds: &Thresholds) -> Self {
        let rsi = coin.rsi_readings().map(|value| RsiCell {
            text: format_rsi(value),
            // Non-numeric readings classify like the sentinel
            class: classify_rsi(
                value.and_then(Numeric::value),
                thresholds.oversold_limit,
                thresholds.overbought_limit,
            ),
        });

        Self {
            symbol: coin.symbol.clone(),
            chart_url: chart_url(&coin.symbol),
            price: format_price(coin.price.as_ref()),
            market_cap: format_market_cap(coin.mcap_value()),
            rsi,
            ticker: coin.ticker.clone(),
        }
    }
}

/// Full replacement row set, in scan order.
pub fn render_rows(coins: &[Coin], thresholds: &Thresholds) -> Vec<RowView> {
    coins
        .iter()
        .map(|coin| RowView::from_coin(coin, thresholds))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(symbol: &str, mcap: f64, rsi: [f64; 4]) -> Coin {
        Coin {
            ticker: format!("{symbol}-USD"),
            symbol: symbol.to_string(),
            price: Some(1.5.into()),
            mcap: Some(mcap.into()),
            rsi_15m: Some(rsi[0].into()),
            rsi_1h: Some(rsi[1].into()),
            rsi_4h: Some(rsi[2].into()),
            rsi_1d: Some(rsi[3].into()),
        }
    }

    fn classes(row: &RowView) -> Vec<RsiClass> {
        row.rsi.iter().map(|cell| cell.class).collect()
    }

    #[test]
    fn test_rows_follow_input_order() {
        // Deliberately not sorted by market cap
        let coins = vec![
            coin("SOL", 80e9, [50.0; 4]),
            coin("BTC", 1300e9, [50.0; 4]),
            coin("PEPE", 4e9, [50.0; 4]),
        ];
        let rows = render_rows(&coins, &Thresholds::default());

        assert_eq!(rows.len(), 3);
        let symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["SOL", "BTC", "PEPE"]);
        assert_eq!(rows[1].ticker, "BTC-USD");
        assert_eq!(rows[1].market_cap, "$1300.00B");
        assert_eq!(rows[1].chart_url, "https://www.tradingview.com/chart/?symbol=BTCUSD");
    }

    #[test]
    fn test_empty_scan_renders_nothing() {
        assert!(render_rows(&[], &Thresholds::default()).is_empty());
    }

    #[test]
    fn test_cells_classified_per_timeframe() {
        let rows = render_rows(&[coin("ETH", 400e9, [25.0, 75.0, 50.0, 0.0])], &Thresholds::default());
        assert_eq!(
            classes(&rows[0]),
            [RsiClass::Oversold, RsiClass::Overbought, RsiClass::Neutral, RsiClass::Neutral]
        );
        assert_eq!(rows[0].rsi[0].text, "25");
        assert_eq!(rows[0].rsi[3].text, "0");
    }

    #[test]
    fn test_rerender_with_new_limits_reclassifies() {
        let coins = vec![coin("ADA", 20e9, [35.0, 65.0, 50.0, 0.0])];
        let before = render_rows(&coins, &Thresholds::default());

        let tighter = Thresholds {
            oversold_limit: 40.0,
            overbought_limit: 60.0,
            ..Thresholds::default()
        };
        let after = render_rows(&coins, &tighter);

        assert_eq!(classes(&before[0]), [RsiClass::Neutral; 4]);
        assert_eq!(
            classes(&after[0]),
            [RsiClass::Oversold, RsiClass::Overbought, RsiClass::Neutral, RsiClass::Neutral]
        );
    }

    #[test]
    fn test_non_numeric_fields_render_raw_and_neutral() {
        let coins: Vec<Coin> = serde_json::from_str(
            r#"[{"symbol": "BTC", "ticker": "BTC-USD", "price": "67000.5", "mcap": "huge",
                 "rsi_15m": "12", "rsi_1h": 20, "rsi_4h": null, "rsi_1d": "n/a"}]"#,
        )
        .unwrap();
        let rows = render_rows(&coins, &Thresholds::default());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, "$67000.5");
        assert_eq!(rows[0].market_cap, "N/A");
        let texts: Vec<&str> = rows[0].rsi.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["12", "20", "-", "n/a"]);
        // "12" would be oversold as a number, but it arrived as text
        assert_eq!(
            classes(&rows[0]),
            [RsiClass::Neutral, RsiClass::Oversold, RsiClass::Neutral, RsiClass::Neutral]
        );
    }

    #[test]
    fn test_absent_fields_render_placeholders() {
        let sparse = Coin {
            ticker: "XYZ-USD".to_string(),
            symbol: "XYZ".to_string(),
            ..Coin::default()
        };
        let row = RowView::from_coin(&sparse, &Thresholds::default());
        assert_eq!(row.price, "$-");
        assert_eq!(row.market_cap, "N/A");
        assert!(row.rsi.iter().all(|c| c.text == "-" && c.class == RsiClass::Neutral));
    }
}
