//! Static service → wire protocol table.
//!
//! Adding a service is a data change: append a row to [`SERVICES`].

use std::borrow::Cow;

/// Request/response wire format family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// `Action=..&Version=..` form bodies, XML responses.
    Query,
    /// Flat JSON bodies addressed by `x-amz-target`, JSON responses.
    JsonRpc,
    /// Parameters in path/query, JSON bodies.
    RestJson,
    /// Parameters in path/query, XML bodies.
    RestXml,
}

/// How the canonical URI is derived from the wire path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriEncoding {
    /// The wire path is used as-is. S3 only.
    Single,
    /// The wire path is percent-encoded once more.
    Double,
}

/// Wire-format rules for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceProtocol {
    /// Name callers use in `RequestSpec::service`.
    pub service: Cow<'static, str>,
    /// Wire protocol family.
    pub protocol: Protocol,
    /// `Version` parameter for query services.
    pub api_version: &'static str,
    /// `x-amz-target` prefix for json-rpc services, e.g. `DynamoDB_20120810`.
    pub target_prefix: &'static str,
    /// `application/x-amz-json-<version>` for json-rpc services.
    pub json_version: &'static str,
    /// Service name in the credential scope.
    pub signing_name: Cow<'static, str>,
    /// First label of the regional endpoint host.
    pub endpoint_prefix: Cow<'static, str>,
    /// Fixed host for partition-global services. These sign with `us-east-1`.
    pub global_endpoint: Option<&'static str>,
}

const fn query(service: &'static str, api_version: &'static str) -> ServiceProtocol {
    query_at(service, api_version, service)
}

/// Query service whose hosts do not start with the service name.
const fn query_at(
    service: &'static str,
    api_version: &'static str,
    endpoint_prefix: &'static str,
) -> ServiceProtocol {
    ServiceProtocol {
        service: Cow::Borrowed(service),
        protocol: Protocol::Query,
        api_version,
        target_prefix: "",
        json_version: "",
        signing_name: Cow::Borrowed(service),
        endpoint_prefix: Cow::Borrowed(endpoint_prefix),
        global_endpoint: None,
    }
}

const fn json(
    service: &'static str,
    target_prefix: &'static str,
    json_version: &'static str,
) -> ServiceProtocol {
    ServiceProtocol {
        service: Cow::Borrowed(service),
        protocol: Protocol::JsonRpc,
        api_version: "",
        target_prefix,
        json_version,
        signing_name: Cow::Borrowed(service),
        endpoint_prefix: Cow::Borrowed(service),
        global_endpoint: None,
    }
}

const fn rest(service: &'static str, protocol: Protocol) -> ServiceProtocol {
    ServiceProtocol {
        service: Cow::Borrowed(service),
        protocol,
        api_version: "",
        target_prefix: "",
        json_version: "",
        signing_name: Cow::Borrowed(service),
        endpoint_prefix: Cow::Borrowed(service),
        global_endpoint: None,
    }
}

const fn global(mut sp: ServiceProtocol, host: &'static str) -> ServiceProtocol {
    sp.global_endpoint = Some(host);
    sp
}

/// Known services.
pub static SERVICES: &[ServiceProtocol] = &[
    // query
    query("autoscaling", "2011-01-01"),
    query("cloudformation", "2010-05-15"),
    query("ec2", "2016-11-15"),
    query("elasticache", "2015-02-02"),
    query("elasticloadbalancing", "2015-12-01"),
    global(query("iam", "2010-05-08"), "iam.amazonaws.com"),
    query("monitoring", "2010-08-01"),
    query("rds", "2014-10-31"),
    query_at("ses", "2010-12-01", "email"),
    query("sns", "2010-03-31"),
    query("sqs", "2012-11-05"),
    query("sts", "2011-06-15"),
    // json-rpc
    json("application-autoscaling", "AnyScaleFrontendService", "1.1"),
    json(
        "cloudtrail",
        "com.amazonaws.cloudtrail.v20131101.CloudTrail_20131101",
        "1.1",
    ),
    json("codedeploy", "CodeDeploy_20141006", "1.1"),
    json("dynamodb", "DynamoDB_20120810", "1.0"),
    json("ecr", "AmazonEC2ContainerRegistry_V20150921", "1.1"),
    json("ecs", "AmazonEC2ContainerServiceV20141113", "1.1"),
    json("events", "AWSEvents", "1.1"),
    json("kinesis", "Kinesis_20131202", "1.1"),
    json("kms", "TrentService", "1.1"),
    json("logs", "Logs_20140328", "1.1"),
    json("secretsmanager", "secretsmanager", "1.1"),
    json("ssm", "AmazonSSM", "1.1"),
    json("states", "AWSStepFunctions", "1.0"),
    // rest-json
    rest("apigateway", Protocol::RestJson),
    rest("backup", Protocol::RestJson),
    rest("eks", Protocol::RestJson),
    rest("elasticfilesystem", Protocol::RestJson),
    rest("lambda", Protocol::RestJson),
    // rest-xml
    global(
        rest("cloudfront", Protocol::RestXml),
        "cloudfront.amazonaws.com",
    ),
    global(rest("route53", Protocol::RestXml), "route53.amazonaws.com"),
    rest("s3", Protocol::RestXml),
];

impl ServiceProtocol {
    /// Look up a service by name.
    ///
    /// Unknown services fall back to the query protocol, signed and addressed
    /// under their own name. Callers must then supply the API version on the
    /// request.
    pub fn lookup(service: &str) -> ServiceProtocol {
        let service = service.to_ascii_lowercase();
        match SERVICES.iter().find(|v| v.service == service) {
            Some(v) => v.clone(),
            None => ServiceProtocol {
                service: Cow::Owned(service.clone()),
                protocol: Protocol::Query,
                api_version: "",
                target_prefix: "",
                json_version: "",
                signing_name: Cow::Owned(service.clone()),
                endpoint_prefix: Cow::Owned(service),
                global_endpoint: None,
            },
        }
    }

    /// Canonical URI rules for this service.
    pub fn uri_encoding(&self) -> UriEncoding {
        if self.signing_name == "s3" {
            UriEncoding::Single
        } else {
            UriEncoding::Double
        }
    }

    /// Whether the payload hash must also travel as `x-amz-content-sha256`.
    pub fn requires_content_sha256(&self) -> bool {
        self.signing_name == "s3"
    }

    /// Region used in the credential scope.
    pub fn signing_region<'a>(&self, region: &'a str) -> &'a str {
        if self.global_endpoint.is_some() {
            "us-east-1"
        } else {
            region
        }
    }

    /// Default endpoint, e.g. `https://sns.us-east-1.amazonaws.com`.
    pub fn endpoint(&self, region: &str) -> String {
        if let Some(host) = self.global_endpoint {
            return format!("https://{host}");
        }

        let suffix = if region.starts_with("cn-") {
            "amazonaws.com.cn"
        } else {
            "amazonaws.com"
        };
        format!("https://{}.{region}.{suffix}", self.endpoint_prefix)
    }

    /// `content-type` for json-rpc requests.
    pub fn json_content_type(&self) -> String {
        format!("application/x-amz-json-{}", self.json_version)
    }
}
