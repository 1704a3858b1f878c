//! S3 buckets.

use serde::{Deserialize, Serialize};

use cfnkit_core::{CfnError, CfnResult, Draft, Properties, Reference, RequiredFields, Resource, Value};

/// Default index document of a static website bucket.
pub const DEFAULT_INDEX_DOCUMENT: &str = "index.html";

/// Canned access control list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessControl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
    LogDeliveryWrite,
}

impl AccessControl {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessControl::Private => "Private",
            AccessControl::PublicRead => "PublicRead",
            AccessControl::PublicReadWrite => "PublicReadWrite",
            AccessControl::AuthenticatedRead => "AuthenticatedRead",
            AccessControl::BucketOwnerRead => "BucketOwnerRead",
            AccessControl::BucketOwnerFullControl => "BucketOwnerFullControl",
            AccessControl::LogDeliveryWrite => "LogDeliveryWrite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|acl| acl.as_str() == s)
    }

    pub fn all() -> Vec<Self> {
        vec![
            AccessControl::Private,
            AccessControl::PublicRead,
            AccessControl::PublicReadWrite,
            AccessControl::AuthenticatedRead,
            AccessControl::BucketOwnerRead,
            AccessControl::BucketOwnerFullControl,
            AccessControl::LogDeliveryWrite,
        ]
    }
}

impl std::fmt::Display for AccessControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static website hosting settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteConfiguration {
    pub index_document: String,
    pub error_document: Option<String>,
}

impl WebsiteConfiguration {
    fn to_value(&self) -> Value {
        let mut props = Properties::new();
        props.insert("IndexDocument".to_string(), self.index_document.clone().into());
        if let Some(error_document) = &self.error_document {
            props.insert("ErrorDocument".to_string(), error_document.clone().into());
        }
        Value::Map(props)
    }
}

/// A finalized bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    name: String,
    access_control: Option<AccessControl>,
    website: Option<WebsiteConfiguration>,
}

impl Bucket {
    pub fn builder() -> BucketBuilder {
        BucketBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn website(&self) -> Option<&WebsiteConfiguration> {
        self.website.as_ref()
    }

    /// `Ref` to this bucket, which resolves to the bucket name.
    pub fn reference(&self) -> Reference {
        Reference::name(self.name.clone())
    }

    pub fn arn(&self) -> Reference {
        Reference::arn(self.name.clone())
    }
}

impl Resource for Bucket {
    fn logical_name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &'static str {
        "AWS::S3::Bucket"
    }

    fn properties(&self) -> Properties {
        let mut props = Properties::new();
        if let Some(access_control) = self.access_control {
            props.insert("AccessControl".to_string(), access_control.as_str().into());
        }
        if let Some(website) = &self.website {
            props.insert("WebsiteConfiguration".to_string(), website.to_value());
        }
        props
    }
}

#[derive(Debug, Default)]
struct BucketDraft {
    name: Option<String>,
    access_control: Option<AccessControl>,
    website: Option<WebsiteConfiguration>,
}

/// Builder for [`Bucket`].
#[derive(Debug)]
pub struct BucketBuilder {
    draft: Draft<BucketDraft>,
}

impl BucketBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("BucketBuilder"),
        }
    }

    /// Bucket that serves a static website from `index.html`.
    pub fn static_website() -> Self {
        let draft = BucketDraft {
            website: Some(WebsiteConfiguration {
                index_document: DEFAULT_INDEX_DOCUMENT.to_string(),
                error_document: None,
            }),
            ..BucketDraft::default()
        };
        Self {
            draft: Draft::from_draft("BucketBuilder", draft),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.draft.update("name", |d| d.name = Some(name));
        self
    }

    pub fn access_control(&mut self, access_control: AccessControl) -> &mut Self {
        self.draft
            .update("access_control", |d| d.access_control = Some(access_control));
        self
    }

    /// Turns on website hosting if it is not on yet.
    pub fn index_document(&mut self, document: impl Into<String>) -> &mut Self {
        let document = document.into();
        self.draft.update("index_document", |d| {
            match &mut d.website {
                Some(website) => website.index_document = document,
                None => {
                    d.website = Some(WebsiteConfiguration {
                        index_document: document,
                        error_document: None,
                    })
                }
            }
        });
        self
    }

    /// Turns on website hosting with the default index document if it is not on yet.
    pub fn error_document(&mut self, document: impl Into<String>) -> &mut Self {
        let document = document.into();
        self.draft.update("error_document", |d| {
            d.website
                .get_or_insert_with(|| WebsiteConfiguration {
                    index_document: DEFAULT_INDEX_DOCUMENT.to_string(),
                    error_document: None,
                })
                .error_document = Some(document);
        });
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<Bucket> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("BucketBuilder").check("name", &d.name);
            let Some(name) = d.name else {
                return Err(required.into_error());
            };
            required.finish()?;

            Ok(Bucket {
                name,
                access_control: d.access_control,
                website: d.website,
            })
        })
    }
}

impl Default for BucketBuilder {
    fn default() -> Self {
        Self::new()
    }
}
