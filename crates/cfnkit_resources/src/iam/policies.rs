//! Canned policy documents.

use cfnkit_core::CfnResult;

use super::{
    Action, Effect, PolicyDocument, PolicyDocumentBuilder, PolicyStatement,
    PolicyStatementBuilder, Principal,
};

/// Trust policy letting `service` (e.g. `lambda.amazonaws.com`) assume a role.
pub fn assume_role_policy(service: &str) -> CfnResult<PolicyDocument> {
    let statement = PolicyStatementBuilder::new()
        .effect(Effect::Allow)
        .principal(Principal::service(service))
        .add_action(Action::new("sts", "AssumeRole"))
        .build()?;

    PolicyDocumentBuilder::new().add_statement(statement).build()
}

fn allow(actions: &[(&str, &str)], resources: &[&str]) -> CfnResult<PolicyStatement> {
    let mut builder = PolicyStatementBuilder::new();
    builder.effect(Effect::Allow);
    for (service, operation) in actions {
        builder.add_action(Action::new(*service, *operation));
    }
    for resource in resources {
        builder.add_resource(*resource);
    }
    builder.build()
}

/// Permissions of the service role used by the one-click CodePipeline setup.
pub fn codepipeline_service_policy() -> CfnResult<PolicyDocument> {
    let statements = [
        allow(
            &[
                ("s3", "GetObject"),
                ("s3", "GetObjectVersion"),
                ("s3", "GetBucketVersioning"),
            ],
            &["*"],
        )?,
        allow(
            &[("s3", "PutObject")],
            &["arn:aws:s3:::codepipeline*", "arn:aws:s3:::elasticbeanstalk*"],
        )?,
        allow(
            &[
                ("codecommit", "CancelUploadArchive"),
                ("codecommit", "GetBranch"),
                ("codecommit", "GetCommit"),
                ("codecommit", "GetUploadArchiveStatus"),
                ("codecommit", "UploadArchive"),
            ],
            &["*"],
        )?,
        allow(
            &[
                ("codedeploy", "CreateDeployment"),
                ("codedeploy", "GetApplicationRevision"),
                ("codedeploy", "GetDeployment"),
                ("codedeploy", "GetDeploymentConfig"),
                ("codedeploy", "RegisterApplicationRevision"),
            ],
            &["*"],
        )?,
        allow(
            &[
                ("elasticbeanstalk", "*"),
                ("ec2", "*"),
                ("elasticloadbalancing", "*"),
                ("autoscaling", "*"),
                ("cloudwatch", "*"),
                ("s3", "*"),
                ("sns", "*"),
                ("cloudformation", "*"),
                ("rds", "*"),
                ("sqs", "*"),
                ("ecs", "*"),
                ("iam", "PassRole"),
            ],
            &["*"],
        )?,
        allow(
            &[("lambda", "InvokeFunction"), ("lambda", "ListFunctions")],
            &["*"],
        )?,
        allow(
            &[
                ("opsworks", "CreateDeployment"),
                ("opsworks", "DescribeApps"),
                ("opsworks", "DescribeCommands"),
                ("opsworks", "DescribeDeployments"),
                ("opsworks", "DescribeInstances"),
                ("opsworks", "DescribeStacks"),
                ("opsworks", "UpdateApp"),
                ("opsworks", "UpdateStack"),
            ],
            &["*"],
        )?,
        allow(
            &[
                ("cloudformation", "CreateStack"),
                ("cloudformation", "DeleteStack"),
                ("cloudformation", "DescribeStacks"),
                ("cloudformation", "UpdateStack"),
                ("cloudformation", "CreateChangeSet"),
                ("cloudformation", "DeleteChangeSet"),
                ("cloudformation", "DescribeChangeSet"),
                ("cloudformation", "ExecuteChangeSet"),
                ("cloudformation", "SetStackPolicy"),
                ("cloudformation", "ValidateTemplate"),
                ("iam", "PassRole"),
            ],
            &["*"],
        )?,
        allow(
            &[("codebuild", "BatchGetBuilds"), ("codebuild", "StartBuild")],
            &["*"],
        )?,
    ];

    let mut builder = PolicyDocumentBuilder::new();
    for statement in statements {
        builder.add_statement(statement);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfnkit_core::STACK_NAME_TOKEN;

    #[test]
    fn test_codepipeline_policy_shape() {
        let policy = codepipeline_service_policy().unwrap();
        assert_eq!(policy.statements().len(), 9);
        assert!(policy
            .statements()
            .iter()
            .all(|s| s.effect() == Effect::Allow));

        let rendered = policy.to_value().to_json(STACK_NAME_TOKEN);
        assert_eq!(rendered["Version"], "2012-10-17");
        assert_eq!(rendered["Statement"][1]["Action"][0], "s3:PutObject");
        assert_eq!(
            rendered["Statement"][1]["Resource"][1],
            "arn:aws:s3:::elasticbeanstalk*"
        );
        assert_eq!(rendered["Statement"][4]["Action"][0], "elasticbeanstalk:*");
    }

    #[test]
    fn test_assume_role_policy() {
        let policy = assume_role_policy("codepipeline.amazonaws.com").unwrap();
        let rendered = policy.to_value().to_json(STACK_NAME_TOKEN);
        assert_eq!(
            rendered["Statement"][0]["Principal"]["Service"][0],
            "codepipeline.amazonaws.com"
        );
        assert!(rendered["Statement"][0].get("Resource").is_none());
    }
}
