use crate::types::Notification;

pub fn subject(n: &Notification) -> String {
    format!("PolyMarket Alert: {}", n.kind.headline(&n.asset.to_uppercase()))
}

pub fn body(n: &Notification) -> String {
    let asset = n.asset.to_uppercase();
    format!(
        "POLYMARKET PRICE ALERT\n\
         \n\
         {headline}\n\
         \n\
         CURRENT YES PRICE: {price:.2}\n\
         \n\
         Current {asset} change: {change:+.2}%\n\
         \n\
         Time: {time}\n",
        headline = n.kind.headline(&asset),
        price = n.yes_price,
        change = n.percent_change,
        time = n.timestamp.format("%Y-%m-%d %H:%M:%S"),
    )
}
