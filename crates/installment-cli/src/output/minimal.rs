use serde_json::Value;

use super::plain;

/// Print just the key figure: the monthly installment of a tier, or the
/// lowest monthly installment of a plan.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "monthlyInstallment",
        "monthly_installment",
        "lowest_monthly_installment",
        "total_paid",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", plain(val));
                    return;
                }
            }
        }

        // edit replays: one monthly figure per tier
        if let Some(Value::Array(tiers)) = map.get("tiers") {
            for tier in tiers {
                let name = tier.get("name").map(plain).unwrap_or_default();
                let monthly = tier.get("monthlyInstallment").map(plain).unwrap_or_default();
                println!("{}: {}", name, monthly);
            }
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, plain(val));
            return;
        }
    }

    println!("{}", plain(result_obj));
}
