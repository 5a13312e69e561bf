//! Extract Module
//!
//! 論理シートごとの抽出処理。各抽出処理は互いの結果に依存せず、
//! 読み込み済みのシートとレイアウトだけを入力に取ります。

mod financials;
mod metrics;
mod products;
mod setup;

pub(crate) use financials::extract_financials;
pub(crate) use metrics::extract_metrics;
pub(crate) use products::extract_products;
pub(crate) use setup::extract_setup;
