use crate::mock::*;
use anyhow::Result;
use async_trait::async_trait;
use http::Method;
use pretty_assertions::assert_eq;
use reqwire_aws::{
    Body, Client, Config, Credential, RequestSpec, RetryPolicy, StaticCredentialProvider,
};
use reqwire_core::{Context, ErrorKind, ProvideCredential};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const CREATE_TOPIC_OK: &str = "<CreateTopicResponse xmlns=\"http://sns.amazonaws.com/doc/2010-03-31/\">\
    <CreateTopicResult><TopicArn>arn:aws:sns:us-east-1:123456789012:orders</TopicArn></CreateTopicResult>\
    <ResponseMetadata><RequestId>a8dec8b3-33a4-11df-8963-01868b7c937a</RequestId></ResponseMetadata>\
    </CreateTopicResponse>";

#[tokio::test]
async fn test_query_round_trip() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::ok(CREATE_TOPIC_OK)]);
    let client = Client::new(test_context(&http));

    let resp = client
        .request(
            RequestSpec::action("sns", "CreateTopic").with_body(Body::params([("Name", "orders")])),
        )
        .await?;

    assert_eq!(
        resp.get_str("/TopicArn"),
        Some("arn:aws:sns:us-east-1:123456789012:orders")
    );
    assert_eq!(
        resp.request_id.as_deref(),
        Some("a8dec8b3-33a4-11df-8963-01868b7c937a")
    );

    let req = http.last_request();
    assert_eq!(req.method(), Method::POST);
    assert_eq!(req.uri().to_string(), "https://sns.us-east-1.amazonaws.com/");
    assert_eq!(
        std::str::from_utf8(req.body())?,
        "Action=CreateTopic&Version=2010-03-31&Name=orders"
    );
    assert_eq!(
        header(&req, "content-type"),
        "application/x-www-form-urlencoded; charset=utf-8"
    );
    assert_eq!(header(&req, "x-amz-date"), "20150830T123600Z");
    assert!(header(&req, "authorization").starts_with(
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/sns/aws4_request, \
         SignedHeaders=content-type;host;x-amz-date, Signature="
    ));
    assert!(req.headers().get("x-amz-security-token").is_none());
    Ok(())
}

#[tokio::test]
async fn test_typed_response() -> Result<()> {
    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct CreateTopicResult {
        topic_arn: String,
    }

    let http = ScriptedHttpSend::new([Reply::ok(CREATE_TOPIC_OK)]);
    let client = Client::new(test_context(&http));

    let out: CreateTopicResult = client
        .request(RequestSpec::action("sns", "CreateTopic").with_body(Body::params([("Name", "orders")])))
        .await?
        .parse()?;
    assert_eq!(out.topic_arn, "arn:aws:sns:us-east-1:123456789012:orders");
    Ok(())
}

#[tokio::test]
async fn test_service_error_is_normalized() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::status(
        400,
        "<ErrorResponse><Error><Type>Sender</Type><Code>InvalidParameter</Code>\
         <Message>Invalid parameter: Name</Message></Error>\
         <RequestId>b5a0e8a2-1c3f-5d2e-9a1b-3c4d5e6f7a8b</RequestId></ErrorResponse>",
    )]);
    let client = Client::new(test_context(&http));

    let err = client
        .request(RequestSpec::action("sns", "CreateTopic").with_body(Body::params([("Name", "")])))
        .await
        .expect_err("service rejects the call");

    assert_eq!(err.kind(), ErrorKind::Client);
    let api = err.api_error().expect("service error must be attached");
    assert_eq!(api.code, "InvalidParameter");
    assert_eq!(api.message, "Invalid parameter: Name");
    assert_eq!(api.status, http::StatusCode::BAD_REQUEST);
    assert_eq!(
        api.request_id.as_deref(),
        Some("b5a0e8a2-1c3f-5d2e-9a1b-3c4d5e6f7a8b")
    );
    assert!(!api.retryable);
    assert_eq!(http.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_request() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::ok(CREATE_TOPIC_OK)]);
    let client = Client::new(context_with(&[("AWS_REGION", "us-east-1")], &http));

    let err = client
        .request(RequestSpec::action("sns", "ListTopics"))
        .await
        .expect_err("no credentials");

    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert_eq!(http.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_session_token_is_signed() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::ok("<ListTopicsResponse><ListTopicsResult/></ListTopicsResponse>")]);
    let ctx = context_with(
        &[
            ("AWS_ACCESS_KEY_ID", ACCESS_KEY_ID),
            ("AWS_SECRET_ACCESS_KEY", SECRET_ACCESS_KEY),
            ("AWS_SESSION_TOKEN", "session-token"),
            ("AWS_REGION", "eu-west-1"),
        ],
        &http,
    );

    Client::new(ctx)
        .request(RequestSpec::action("sns", "ListTopics"))
        .await?;

    let req = http.last_request();
    assert_eq!(req.uri().host(), Some("sns.eu-west-1.amazonaws.com"));
    assert_eq!(header(&req, "x-amz-security-token"), "session-token");
    assert!(header(&req, "authorization").contains(
        "SignedHeaders=content-type;host;x-amz-date;x-amz-security-token,"
    ));
    Ok(())
}

#[tokio::test]
async fn test_endpoint_override() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::ok("<ListTopicsResponse><ListTopicsResult/></ListTopicsResponse>")]);
    let client = Client::new(test_context(&http))
        .with_config(Config::new().with_region("us-east-1").with_endpoint_url("http://localhost:4566"));

    client
        .request(RequestSpec::action("sns", "ListTopics"))
        .await?;
    let req = http.last_request();
    assert_eq!(req.uri().to_string(), "http://localhost:4566/");
    assert_eq!(header(&req, "host"), "localhost:4566");

    // A per request endpoint wins over the config.
    client
        .request(RequestSpec::action("sns", "ListTopics").with_endpoint("http://127.0.0.1:9911"))
        .await?;
    assert_eq!(header(&http.last_request(), "host"), "127.0.0.1:9911");
    Ok(())
}

#[tokio::test]
async fn test_relative_endpoint_is_config_error() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::ok("")]);
    let client = Client::new(test_context(&http));

    let err = client
        .request(RequestSpec::action("sns", "ListTopics").with_endpoint("localhost:4566"))
        .await
        .expect_err("endpoint has no scheme");
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert_eq!(http.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_json_rpc_call() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::Response {
        status: 200,
        headers: vec![("x-amzn-requestid", "ddb-request")],
        body: r#"{"TableNames":["orders","users"]}"#.to_string(),
    }]);
    let client = Client::new(test_context(&http));

    let resp = client
        .request(
            RequestSpec::action("dynamodb", "ListTables").with_body(Body::Json(json!({"Limit": 10}))),
        )
        .await?;
    assert_eq!(resp.get("/TableNames/1"), Some(&json!("users")));
    assert_eq!(resp.request_id.as_deref(), Some("ddb-request"));

    let req = http.last_request();
    assert_eq!(req.uri().host(), Some("dynamodb.us-east-1.amazonaws.com"));
    assert_eq!(header(&req, "x-amz-target"), "DynamoDB_20120810.ListTables");
    assert_eq!(header(&req, "content-type"), "application/x-amz-json-1.0");
    let sent: serde_json::Value = serde_json::from_slice(req.body())?;
    assert_eq!(sent, json!({"Limit": 10}));
    Ok(())
}

#[tokio::test]
async fn test_json_rpc_throttling_is_retried() -> Result<()> {
    let http = ScriptedHttpSend::new([
        Reply::status(
            400,
            r#"{"__type":"com.amazonaws.dynamodb.v20120810#ThrottlingException","message":"slow down"}"#,
        ),
        Reply::ok(r#"{"TableNames":[]}"#),
    ]);
    let client = Client::new(test_context(&http))
        .with_retry_policy(RetryPolicy::default().with_base_delay(Duration::from_millis(1)));

    let resp = client
        .request(RequestSpec::action("dynamodb", "ListTables"))
        .await?;
    assert_eq!(resp.get("/TableNames"), Some(&json!([])));
    assert_eq!(http.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_s3_path_is_encoded_once() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::ok("")]);
    let client = Client::new(test_context(&http));

    client
        .request(RequestSpec::new("s3", Method::GET, "/bucket/a b/c+d"))
        .await?;

    let req = http.last_request();
    assert_eq!(req.uri().path(), "/bucket/a%20b/c%2Bd");
    assert_eq!(
        header(&req, "x-amz-content-sha256"),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(
        header(&req, "authorization"),
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/s3/aws4_request, \
         SignedHeaders=host;x-amz-content-sha256;x-amz-date, \
         Signature=8640143909b1add009300e47d6dac0df5c519d0ae6226cdb097fa459a6518876"
    );
    Ok(())
}

#[tokio::test]
async fn test_global_service_signs_us_east_1() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::ok(
        "<ListUsersResponse><ListUsersResult><Users/><IsTruncated>false</IsTruncated></ListUsersResult></ListUsersResponse>",
    )]);
    let client = Client::new(test_context(&http))
        .with_config(Config::new().with_region("eu-central-1"));

    let resp = client
        .request(RequestSpec::action("iam", "ListUsers"))
        .await?;
    assert_eq!(resp.get_str("/IsTruncated"), Some("false"));

    let req = http.last_request();
    assert_eq!(req.uri().host(), Some("iam.amazonaws.com"));
    assert!(header(&req, "authorization").contains("/20150830/us-east-1/iam/aws4_request"));
    Ok(())
}

/// Provider that hands out a new access key on every call.
#[derive(Debug, Default)]
struct RotatingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl ProvideCredential for RotatingProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> reqwire_core::Result<Option<Credential>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Credential::new(format!("AKID{n}"), SECRET_ACCESS_KEY)))
    }
}

#[tokio::test]
async fn test_credentials_are_resolved_per_call() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::ok("<ListTopicsResponse><ListTopicsResult/></ListTopicsResponse>")]);
    let client = Client::new(test_context(&http)).with_credential_provider(RotatingProvider::default());

    for expected in ["AKID0", "AKID1"] {
        client
            .request(RequestSpec::action("sns", "ListTopics"))
            .await?;
        let auth = header(&http.last_request(), "authorization").to_string();
        assert!(
            auth.contains(&format!("Credential={expected}/")),
            "unexpected authorization: {auth}"
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_static_provider_overrides_env() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::ok("<ListTopicsResponse><ListTopicsResult/></ListTopicsResponse>")]);
    let client = Client::new(test_context(&http))
        .with_credential_provider(StaticCredentialProvider::new("AKIDSTATIC", SECRET_ACCESS_KEY));

    client
        .request(RequestSpec::action("sns", "ListTopics"))
        .await?;
    assert!(header(&http.last_request(), "authorization").contains("Credential=AKIDSTATIC/"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::ok(CREATE_TOPIC_OK)]);
    let client = Client::new(test_context(&http));

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .request(
                        RequestSpec::action("sns", "CreateTopic")
                            .with_body(Body::params([("Name", format!("topic-{i}"))])),
                    )
                    .await
            })
        })
        .collect();

    for task in tasks {
        let resp = task.await??;
        assert_eq!(
            resp.get_str("/TopicArn"),
            Some("arn:aws:sns:us-east-1:123456789012:orders")
        );
    }
    assert_eq!(http.calls(), 16);
    Ok(())
}

#[tokio::test]
async fn test_huge_timeout_from_env() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::ok("<ListTopicsResponse><ListTopicsResult/></ListTopicsResponse>")]);
    let ctx = context_with(
        &[
            ("AWS_ACCESS_KEY_ID", ACCESS_KEY_ID),
            ("AWS_SECRET_ACCESS_KEY", SECRET_ACCESS_KEY),
            ("AWS_REGION", "us-east-1"),
            ("REQWIRE_AWS_TIMEOUT_SECS", "18446744073709551615"),
        ],
        &http,
    );

    let client = Client::new(ctx);
    assert_eq!(client.config().timeout(), reqwire_aws::DEFAULT_TIMEOUT);
    client
        .request(RequestSpec::action("sns", "ListTopics"))
        .await?;

    let client = client.with_config(Config::new().with_region("us-east-1").with_timeout(Duration::MAX));
    client
        .request(RequestSpec::action("sns", "ListTopics"))
        .await?;
    assert_eq!(http.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_s3_object_body_is_passed_through() -> Result<()> {
    let http = ScriptedHttpSend::new([Reply::Response {
        status: 200,
        headers: vec![("content-type", "text/plain"), ("x-amz-request-id", "s3-req")],
        body: "hello world".to_string(),
    }]);
    let client = Client::new(test_context(&http));

    let resp = client
        .request(RequestSpec::new("s3", Method::GET, "/bucket/key.txt"))
        .await?;
    assert_eq!(resp.raw.as_ref(), b"hello world");
    assert_eq!(resp.body, json!("hello world"));
    assert_eq!(resp.request_id.as_deref(), Some("s3-req"));
    Ok(())
}
