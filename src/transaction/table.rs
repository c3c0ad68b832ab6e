//! The HTML table used to display transactions on the ledger and history pages.

use maud::{Markup, html};
use time::{UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::html::{
    TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency, truncate_graphemes,
};

use super::core::{Transaction, TransactionKind};

/// The max number of graphemes to display in the note column before
/// truncating and displaying ellipses.
const MAX_NOTE_GRAPHEMES: usize = 32;

const DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

fn amount_class(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income | TransactionKind::AdjustmentIn => {
            "text-green-700 dark:text-green-300"
        }
        TransactionKind::Expense | TransactionKind::AdjustmentOut => {
            "text-red-700 dark:text-red-300"
        }
    }
}

fn signed_amount(transaction: &Transaction) -> f64 {
    match transaction.kind {
        TransactionKind::Income | TransactionKind::AdjustmentIn => transaction.amount,
        TransactionKind::Expense | TransactionKind::AdjustmentOut => -transaction.amount,
    }
}

fn format_occurred_at(transaction: &Transaction, local_offset: UtcOffset) -> String {
    let local_time = transaction.occurred_at.to_offset(local_offset);

    local_time
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| local_time.to_string())
}

/// Render `transactions` as a table, oldest first.
pub(crate) fn transaction_table(
    transactions: &[Transaction],
    local_offset: UtcOffset,
    empty_message: &str,
) -> Markup {
    html! {
        table class="w-full my-2 text-sm text-left rtl:text-right
            text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Truck" }
                    th scope="col" class="px-6 py-3 text-right" { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                }
            }

            tbody
            {
                @for transaction in transactions {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE)
                        {
                            (format_occurred_at(transaction, local_offset))
                        }

                        td class=(TABLE_CELL_STYLE)
                        {
                            (transaction.kind.label())
                        }

                        td class=(TABLE_CELL_STYLE)
                        {
                            (transaction.truck_id.as_deref().unwrap_or("—"))
                        }

                        td class={"px-6 py-4 text-right " (amount_class(transaction.kind))}
                        {
                            (format_currency(signed_amount(transaction)))
                        }

                        td class=(TABLE_CELL_STYLE)
                        {
                            (transaction.expense_type.as_deref().unwrap_or("—"))
                        }

                        td class=(TABLE_CELL_STYLE)
                        {
                            @if let Some(note) = &transaction.note {
                                (truncate_graphemes(note, MAX_NOTE_GRAPHEMES))
                            } @else {
                                "—"
                            }
                        }
                    }
                }

                @if transactions.is_empty() {
                    tr
                    {
                        td
                            colspan="6"
                            class="px-6 py-4 text-center
                                text-gray-500 dark:text-gray-400"
                        {
                            (empty_message)
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod transaction_table_tests {
    use scraper::{Html, Selector};
    use time::{UtcOffset, macros::datetime};

    use crate::transaction::{Transaction, TransactionKind};

    use super::transaction_table;

    fn parse(markup: maud::Markup) -> Html {
        Html::parse_fragment(&markup.into_string())
    }

    #[test]
    fn renders_one_row_per_transaction() {
        let transactions = vec![
            Transaction {
                id: 1,
                kind: TransactionKind::Income,
                truck_id: Some("truck-1".to_owned()),
                amount: 100.0,
                expense_type: None,
                note: None,
                occurred_at: datetime!(2026-03-01 09:00:00 UTC),
            },
            Transaction {
                id: 2,
                kind: TransactionKind::Expense,
                truck_id: Some("truck-1".to_owned()),
                amount: 30.0,
                expense_type: Some("Fuel".to_owned()),
                note: Some("fill up".to_owned()),
                occurred_at: datetime!(2026-03-02 09:00:00 UTC),
            },
        ];

        let html = parse(transaction_table(&transactions, UtcOffset::UTC, "empty"));

        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 2);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("$100.00"));
        assert!(text.contains("-$30.00"));
        assert!(text.contains("Fuel"));
    }

    #[test]
    fn shows_empty_message_when_there_are_no_transactions() {
        let html = parse(transaction_table(
            &[],
            UtcOffset::UTC,
            "No transactions recorded yet.",
        ));

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No transactions recorded yet."));
    }

    #[test]
    fn displays_times_in_the_local_timezone() {
        let transactions = vec![Transaction {
            id: 1,
            kind: TransactionKind::Income,
            truck_id: None,
            amount: 1.0,
            expense_type: None,
            note: None,
            occurred_at: datetime!(2026-03-01 23:30:00 UTC),
        }];
        let offset = UtcOffset::from_hms(2, 0, 0).unwrap();

        let html = parse(transaction_table(&transactions, offset, "empty"));

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("2026-03-02 01:30"), "got: {text}");
    }
}
