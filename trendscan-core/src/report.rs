//! Message formatting (Telegram Markdown).
//!
//! Every function is pure; delivery lives in `notify`.

use chrono::NaiveDate;

use crate::domain::{Candidate, ExitDecision, ExitReason, ExitReview};

pub const DISCLAIMER: &str = "⚠️ _Educational use only. Not investment advice._";

/// Account figures shown in the entry report header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Account {
    pub portfolio_size: f64,
    pub risk_per_trade: f64,
}

fn header_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

fn with_footer(mut body: String) -> String {
    if !body.ends_with('\n') {
        body.push('\n');
    }
    body.push_str("\n---\n");
    body.push_str(DISCLAIMER);
    body
}

/// Round to a whole number and group digits with commas: `12345.6` → `12,346`.
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = group_digits(rounded.abs() as u64);
    if rounded < 0.0 {
        format!("-{digits}")
    } else {
        digits
    }
}

pub fn group_digits(value: u64) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn entry_report(candidates: &[Candidate], account: Account, date: NaiveDate) -> String {
    let total_investment: f64 = candidates.iter().map(|c| c.position_value).sum();
    let total_risk: f64 = candidates.iter().map(|c| c.actual_risk).sum();
    let risk_pct = if account.portfolio_size > 0.0 {
        total_risk / account.portfolio_size * 100.0
    } else {
        0.0
    };

    let mut msg = format!("🎯 *WEEKLY BUY SIGNALS* ({})\n\n", header_date(date));
    msg += &format!(
        "Portfolio: ${} | Risk: {:.1}%\n",
        thousands(account.portfolio_size),
        account.risk_per_trade * 100.0
    );
    msg += &format!("Total investment: ${}\n", thousands(total_investment));
    msg += &format!("Total risk: ${} ({risk_pct:.1}%)\n\n", thousands(total_risk));

    for c in candidates {
        msg += &format!(
            "✅ *{}* ({})\n\
             Price: ${:.2} | Stop: ${:.2}\n\
             Shares: {} | Position: ${}\n\
             Risk: ${} | R-Score: {:.2}\n",
            c.ticker,
            c.sector,
            c.price,
            c.stop,
            group_digits(c.shares),
            thousands(c.position_value),
            thousands(c.actual_risk),
            c.r_score,
        );
        let mut extras = vec![format!("ATR: {:.2} ({:.1}x)", c.atr, c.atr_ratio)];
        if let Some(rsi) = c.rsi {
            extras.push(format!("RSI: {rsi:.0}"));
        }
        if let Some(h) = c.macd_histogram {
            extras.push(format!("MACD hist: {h:.2}"));
        }
        msg += &extras.join(" | ");
        msg += "\n\n";
    }

    with_footer(msg)
}

pub fn no_signal_report(date: NaiveDate) -> String {
    with_footer(format!(
        "📭 *RESULT*: no suitable buy signal for {}.\n\nStaying in cash may be the safest option.",
        header_date(date)
    ))
}

/// Sent instead of an entry report when the market filter is bearish.
pub fn market_warning_report(
    symbol: &str,
    close: f64,
    ma: f64,
    ma_period: usize,
    date: NaiveDate,
) -> String {
    with_footer(format!(
        "🚫 *MARKET WARNING* ({})\n\n{symbol} closed at ${close:.2}, below its {ma_period}-week MA (${ma:.2}).\nSkipping this week's scan.",
        header_date(date)
    ))
}

pub fn exit_report(reviews: &[ExitReview], date: NaiveDate) -> String {
    let exits = reviews.iter().filter(|r| r.is_exit()).count();
    let mut msg = format!(
        "🔔 *EXIT CHECK* ({})\n\n{} position(s), {exits} exit signal(s)\n\n",
        header_date(date),
        reviews.len()
    );

    for review in reviews {
        let p = &review.position;
        let line = match &review.decision {
            ExitDecision::Exit {
                reason: ExitReason::StopHit,
                close,
            } => format!("🔴 *{}* EXIT: close ${close:.2} below stop ${:.2}", p.ticker, p.stop),
            ExitDecision::Exit {
                reason: ExitReason::TrendFlip,
                close,
            } => format!("🔴 *{}* EXIT: SuperTrend turned down (close ${close:.2})", p.ticker),
            ExitDecision::Hold { close } => {
                format!("🟢 *{}* HOLD: close ${close:.2}, stop ${:.2}", p.ticker, p.stop)
            }
            ExitDecision::NoData { .. } => format!("⚪ *{}* NO DATA", p.ticker),
        };
        msg += &line;
        msg.push('\n');
    }

    with_footer(msg)
}
