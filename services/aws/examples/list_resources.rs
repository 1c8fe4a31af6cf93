use anyhow::Result;
use reqwire_aws::{Body, Client, RequestSpec};
use reqwire_core::{Context, OsEnv};
use reqwire_http_send_reqwest::ReqwestHttpSend;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListTablesOutput {
    table_names: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Credentials and region come from AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY
    // and AWS_REGION.
    let ctx = Context::new()
        .with_env(OsEnv)
        .with_http_send(ReqwestHttpSend::new(reqwest::Client::new()));
    let client = Client::new(ctx);

    // Query protocol
    println!("Example 1: Listing SNS topics");
    let resp = client.request(RequestSpec::action("sns", "ListTopics")).await?;
    println!("Request id: {:?}", resp.request_id);
    println!("Topics: {}", serde_json::to_string_pretty(&resp.body)?);

    // JSON-RPC protocol, decoded into a typed struct
    println!("\nExample 2: Listing DynamoDB tables");
    let tables: ListTablesOutput = client
        .request(
            RequestSpec::action("dynamodb", "ListTables").with_body(Body::Json(json!({"Limit": 10}))),
        )
        .await?
        .parse()?;
    println!("Tables: {:?}", tables.table_names);

    // Service errors keep the code the service sent
    println!("\nExample 3: Describing a table that does not exist");
    match client
        .request(
            RequestSpec::action("dynamodb", "DescribeTable")
                .with_body(Body::Json(json!({"TableName": "MyMissingTable"}))),
        )
        .await
    {
        Ok(resp) => println!("Table: {}", resp.body),
        Err(e) => match e.api_error() {
            Some(api) => eprintln!("Service error {}: {}", api.code, api.message),
            None => eprintln!("Request failed: {e}"),
        },
    }

    Ok(())
}
