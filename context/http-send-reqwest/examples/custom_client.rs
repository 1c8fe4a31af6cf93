use bytes::Bytes;
use reqwest::Client;
use reqwire_core::Context;
use reqwire_http_send_reqwest::ReqwestHttpSend;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .user_agent("reqwire-example/0.1")
        .build()?;

    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));

    let req = http::Request::builder()
        .method("GET")
        .uri("https://sts.amazonaws.com/?Action=GetCallerIdentity&Version=2011-06-15")
        .body(Bytes::new())?;

    // Unsigned on purpose: STS answers with an XML error we can print.
    let resp = ctx.http_send(req).await?;
    println!("status: {}", resp.status());
    println!("{}", String::from_utf8_lossy(resp.body()));

    Ok(())
}
