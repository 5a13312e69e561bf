//! Financial Category Taxonomy
//!
//! 財務シートの行を5つの固定カテゴリのいずれかに分類します。
//! 判定規則は順序付きのテーブルとして定義され、上から順に評価されます。

use serde::Serialize;
use std::fmt;

use crate::normalize::normalize_key;

/// 財務カテゴリ（閉じた集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Revenue,
    CostOfSale,
    Opex,
    FinancingCost,
    Capex,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Revenue,
        Category::CostOfSale,
        Category::Opex,
        Category::FinancingCost,
        Category::Capex,
    ];

    /// JSONキーとして使用する名前
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Revenue => "revenue",
            Category::CostOfSale => "cost_of_sale",
            Category::Opex => "opex",
            Category::FinancingCost => "financing_cost",
            Category::Capex => "capex",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// カテゴリ判定規則
///
/// 正規化済みキーに対して、同義語テーブルの完全一致を先に評価し、
/// 一致しなければ部分一致規則を記載順に評価します。
#[derive(Debug, Clone, Copy)]
pub struct CategoryRules {
    /// 完全一致の同義語
    pub synonyms: &'static [(&'static str, Category)],
    /// 部分一致規則（記載順が優先順位）
    pub contains: &'static [(&'static [&'static str], Category)],
}

/// 既定の判定規則
///
/// 部分一致では売上原価の規則が営業費用・売上の規則より先に評価されなければならない
/// （"cost of sales" は "sales" にも一致する）。
pub const CATEGORY_RULES: CategoryRules = CategoryRules {
    synonyms: &[
        ("revenue", Category::Revenue),
        ("revenues", Category::Revenue),
        ("income", Category::Revenue),
        ("sales", Category::Revenue),
        ("cost_of_sale", Category::CostOfSale),
        ("cost_of_sales", Category::CostOfSale),
        ("cogs", Category::CostOfSale),
        ("cost_of_goods_sold", Category::CostOfSale),
        ("cost_of_goods", Category::CostOfSale),
        ("direct_cost", Category::CostOfSale),
        ("direct_costs", Category::CostOfSale),
        ("cost_of_revenue", Category::CostOfSale),
        ("opex", Category::Opex),
        ("operating_expenses", Category::Opex),
        ("operating_expense", Category::Opex),
        ("operating_costs", Category::Opex),
        ("operating_cost", Category::Opex),
        ("operating_expenditure", Category::Opex),
        ("operating_expenditures", Category::Opex),
        ("expenses", Category::Opex),
        ("expenditure", Category::Opex),
        ("expenditures", Category::Opex),
        ("financing_cost", Category::FinancingCost),
        ("financing_costs", Category::FinancingCost),
        ("finance_cost", Category::FinancingCost),
        ("finance_costs", Category::FinancingCost),
        ("interest_expense", Category::FinancingCost),
        ("interest_expenses", Category::FinancingCost),
        ("interest_cost", Category::FinancingCost),
        ("interest_costs", Category::FinancingCost),
        ("financial_cost", Category::FinancingCost),
        ("financial_costs", Category::FinancingCost),
        ("capex", Category::Capex),
        ("capital_expenditure", Category::Capex),
        ("capital_expenditures", Category::Capex),
        ("capital_investment", Category::Capex),
        ("capital_investments", Category::Capex),
        ("capital_expense", Category::Capex),
        ("capital_expenses", Category::Capex),
    ],
    contains: &[
        (
            &[
                "cost_of_sale",
                "cost_of_sales",
                "cogs",
                "cost_of_goods",
                "direct_cost",
            ],
            Category::CostOfSale,
        ),
        (
            &[
                "opex",
                "operating_expense",
                "operating_cost",
                "operating_expenditure",
            ],
            Category::Opex,
        ),
        (&["revenue", "income", "sales"], Category::Revenue),
        (&["financing", "finance", "interest"], Category::FinancingCost),
        (
            &[
                "capex",
                "capital_expenditure",
                "capital_investment",
                "capital_expense",
            ],
            Category::Capex,
        ),
    ],
};

impl CategoryRules {
    /// 自由記述のカテゴリ名を分類
    ///
    /// どの規則にも一致しない場合は`None`を返します。
    pub fn resolve(&self, raw: &str) -> Option<Category> {
        let key = normalize_key(raw.trim());
        if key.is_empty() {
            return None;
        }

        if let Some((_, category)) = self.synonyms.iter().find(|(synonym, _)| *synonym == key) {
            return Some(*category);
        }

        self.contains
            .iter()
            .find(|(patterns, _)| patterns.iter().any(|p| key.contains(p)))
            .map(|(_, category)| *category)
    }
}
