//! Lambda functions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use cfnkit_core::{
    CfnError, CfnResult, Draft, Properties, Reference, RequiredFields, Resource, Value,
};

use crate::iam::Role;

/// Smallest and largest memory size accepted, in MB.
pub const MEMORY_RANGE: std::ops::RangeInclusive<u32> = 128..=10240;

/// Longest allowed timeout, in seconds.
pub const MAX_TIMEOUT_SECONDS: u32 = 900;

/// Function runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Runtime {
    Python3x,
    Python2x,
    Node6x,
    Python312,
    Nodejs20x,
    Java21,
    ProvidedAl2023,
}

impl Runtime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Python3x => "python3.6",
            Runtime::Python2x => "python2.7",
            Runtime::Node6x => "nodejs6.10",
            Runtime::Python312 => "python3.12",
            Runtime::Nodejs20x => "nodejs20.x",
            Runtime::Java21 => "java21",
            Runtime::ProvidedAl2023 => "provided.al2023",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Runtime::Python3x,
            Runtime::Python2x,
            Runtime::Node6x,
            Runtime::Python312,
            Runtime::Nodejs20x,
            Runtime::Java21,
            Runtime::ProvidedAl2023,
        ]
    }
}

impl std::fmt::Display for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the function code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    /// Inline source, joined without a delimiter.
    ZipFile(Vec<String>),
    S3 { bucket: String, key: String },
}

impl Code {
    fn to_value(&self) -> Value {
        match self {
            Code::ZipFile(lines) => Value::map([("ZipFile", Value::join(lines.iter().cloned()))]),
            Code::S3 { bucket, key } => Value::map([
                ("S3Bucket", bucket.clone()),
                ("S3Key", key.clone()),
            ]),
        }
    }
}

/// A finalized Lambda function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    name: String,
    code: Code,
    handler: String,
    role: Reference,
    runtime: Runtime,
    memory: u32,
    timeout: Option<u32>,
    variables: IndexMap<String, String>,
}

impl Function {
    pub fn builder() -> FunctionBuilder {
        FunctionBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    pub fn memory(&self) -> u32 {
        self.memory
    }

    pub fn arn(&self) -> Reference {
        Reference::arn(self.name.clone())
    }
}

impl Resource for Function {
    fn logical_name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &'static str {
        "AWS::Lambda::Function"
    }

    fn properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("Code".to_string(), self.code.to_value());
        props.insert("Handler".to_string(), self.handler.clone().into());
        props.insert(
            "FunctionName".to_string(),
            Reference::substitution(self.name.clone(), "").into(),
        );
        props.insert("MemorySize".to_string(), self.memory.into());
        props.insert("Role".to_string(), self.role.clone().into());
        props.insert("Runtime".to_string(), self.runtime.as_str().into());
        if let Some(timeout) = self.timeout {
            props.insert("Timeout".to_string(), timeout.into());
        }
        props.insert(
            "Environment".to_string(),
            Value::map([(
                "Variables",
                Value::map(self.variables.iter().map(|(k, v)| (k.clone(), v.clone()))),
            )]),
        );
        props
    }
}

#[derive(Debug)]
struct FunctionDraft {
    name: Option<String>,
    code: Option<Code>,
    handler: Option<String>,
    role: Option<Reference>,
    runtime: Option<Runtime>,
    memory: u32,
    timeout: Option<u32>,
    variables: IndexMap<String, String>,
}

impl Default for FunctionDraft {
    fn default() -> Self {
        Self {
            name: None,
            code: None,
            handler: None,
            role: None,
            runtime: None,
            memory: *MEMORY_RANGE.start(),
            timeout: None,
            variables: IndexMap::new(),
        }
    }
}

/// Builder for [`Function`].
#[derive(Debug)]
pub struct FunctionBuilder {
    draft: Draft<FunctionDraft>,
}

impl FunctionBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("FunctionBuilder"),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.draft.update("name", |d| d.name = Some(name));
        self
    }

    /// Add one environment variable. A repeated key keeps its position and
    /// takes the new value.
    pub fn add_environment_variable(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let (key, value) = (key.into(), value.into());
        self.draft.update("add_environment_variable", |d| {
            d.variables.insert(key, value);
        });
        self
    }

    /// Inline source code, one fragment per line.
    pub fn source_code<S: Into<String>>(&mut self, lines: impl IntoIterator<Item = S>) -> &mut Self {
        let lines = lines.into_iter().map(Into::into).collect();
        self.draft
            .update("source_code", |d| d.code = Some(Code::ZipFile(lines)));
        self
    }

    /// Code stored as an archive in S3.
    pub fn s3_code(&mut self, bucket: impl Into<String>, key: impl Into<String>) -> &mut Self {
        let code = Code::S3 {
            bucket: bucket.into(),
            key: key.into(),
        };
        self.draft.update("s3_code", |d| d.code = Some(code));
        self
    }

    pub fn handler(&mut self, handler: impl Into<String>) -> &mut Self {
        let handler = handler.into();
        self.draft.update("handler", |d| d.handler = Some(handler));
        self
    }

    /// Execution role; stored as a lookup of the role's ARN.
    pub fn role(&mut self, role: &Role) -> &mut Self {
        let arn = role.arn();
        self.draft.update("role", |d| d.role = Some(arn));
        self
    }

    /// Execution role by logical name, for roles built elsewhere.
    pub fn role_name(&mut self, name: impl Into<String>) -> &mut Self {
        let arn = Reference::arn(name);
        self.draft.update("role_name", |d| d.role = Some(arn));
        self
    }

    pub fn runtime(&mut self, runtime: Runtime) -> &mut Self {
        self.draft.update("runtime", |d| d.runtime = Some(runtime));
        self
    }

    /// Memory size in MB. Defaults to 128.
    pub fn memory(&mut self, memory: u32) -> &mut Self {
        self.draft.update("memory", |d| d.memory = memory);
        self
    }

    pub fn timeout(&mut self, seconds: u32) -> &mut Self {
        self.draft.update("timeout", |d| d.timeout = Some(seconds));
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<Function> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("FunctionBuilder")
                .check("name", &d.name)
                .check("code", &d.code)
                .check("handler", &d.handler)
                .check("role", &d.role)
                .check("runtime", &d.runtime);
            let (Some(name), Some(code), Some(handler), Some(role), Some(runtime)) =
                (d.name, d.code, d.handler, d.role, d.runtime)
            else {
                return Err(required.into_error());
            };
            required.finish()?;

            if !MEMORY_RANGE.contains(&d.memory) {
                return Err(CfnError::InvalidValue {
                    field: "memory",
                    reason: format!(
                        "{} MB is outside {}..={} MB",
                        d.memory,
                        MEMORY_RANGE.start(),
                        MEMORY_RANGE.end()
                    ),
                });
            }
            if let Some(timeout) = d.timeout {
                if timeout == 0 || timeout > MAX_TIMEOUT_SECONDS {
                    return Err(CfnError::InvalidValue {
                        field: "timeout",
                        reason: format!("{timeout}s is outside 1..={MAX_TIMEOUT_SECONDS}s"),
                    });
                }
            }

            Ok(Function {
                name,
                code,
                handler,
                role,
                runtime,
                memory: d.memory,
                timeout: d.timeout,
                variables: d.variables,
            })
        })
    }
}

impl Default for FunctionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfnkit_core::STACK_NAME_TOKEN;
    use serde_json::json;

    fn hello_builder() -> FunctionBuilder {
        let mut builder = FunctionBuilder::new();
        builder
            .name("HelloFunction")
            .source_code(["def handler(event, context):\n", "    return 'hello'\n"])
            .handler("index.handler")
            .role_name("HelloRole")
            .runtime(Runtime::Python3x);
        builder
    }

    #[test]
    fn test_function_properties() {
        let function = hello_builder()
            .add_environment_variable("STAGE", "dev")
            .build()
            .unwrap();

        let props = Value::Map(function.properties()).to_json(STACK_NAME_TOKEN);
        assert_eq!(
            props,
            json!({
                "Code": { "ZipFile": { "Fn::Join": ["", [
                    "def handler(event, context):\n",
                    "    return 'hello'\n"
                ]] } },
                "Handler": "index.handler",
                "FunctionName": { "Fn::Sub": "HelloFunction${AWS::StackName}" },
                "MemorySize": 128,
                "Role": { "Fn::GetAtt": ["HelloRole", "Arn"] },
                "Runtime": "python3.6",
                "Environment": { "Variables": { "STAGE": "dev" } }
            })
        );
    }

    #[test]
    fn test_each_required_field_is_enforced() {
        let setters: [(&str, fn(&mut FunctionBuilder)); 5] = [
            ("name", |b: &mut FunctionBuilder| {
                b.name("F");
            }),
            ("code", |b: &mut FunctionBuilder| {
                b.s3_code("bucket", "key.zip");
            }),
            ("handler", |b: &mut FunctionBuilder| {
                b.handler("index.handler");
            }),
            ("role", |b: &mut FunctionBuilder| {
                b.role_name("R");
            }),
            ("runtime", |b: &mut FunctionBuilder| {
                b.runtime(Runtime::Nodejs20x);
            }),
        ];

        for skipped in 0..setters.len() {
            let mut builder = FunctionBuilder::new();
            for (i, (_, set)) in setters.iter().enumerate() {
                if i != skipped {
                    set(&mut builder);
                }
            }
            match builder.build() {
                Err(CfnError::MissingRequiredField { fields, .. }) => {
                    assert_eq!(fields, vec![setters[skipped].0]);
                }
                other => panic!("expected missing {}, got {other:?}", setters[skipped].0),
            }
        }

        let mut builder = FunctionBuilder::new();
        for (_, set) in &setters {
            set(&mut builder);
        }
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_memory_out_of_range() {
        let err = hello_builder().memory(64).build().unwrap_err();
        assert!(matches!(err, CfnError::InvalidValue { field: "memory", .. }));
        assert!(hello_builder().memory(1024).build().is_ok());
    }

    #[test]
    fn test_timeout_bounds() {
        let err = hello_builder().timeout(901).build().unwrap_err();
        assert!(matches!(err, CfnError::InvalidValue { field: "timeout", .. }));
    }

    #[test]
    fn test_runtime_strings() {
        assert_eq!(Runtime::Python2x.to_string(), "python2.7");
        assert_eq!(Runtime::Node6x.to_string(), "nodejs6.10");
        assert_eq!(Runtime::all().len(), 7);
    }

    #[test]
    fn test_setter_after_build_keeps_function() {
        let mut builder = hello_builder();
        let function = builder.build().unwrap();

        builder.memory(512);
        assert!(matches!(
            builder.fault(),
            Some(CfnError::IllegalState { operation: "memory", .. })
        ));
        assert_eq!(function.memory(), 128);
    }
}
