//! Integration tests composing resource builders into documents.

use cfnkit_core::{CfnError, Document, Format};
use cfnkit_resources::awslambda::{FunctionBuilder, Runtime};
use cfnkit_resources::codepipeline::{
    ActionBuilder, ActionTypeIdBuilder, PipelineBuilder, StageBuilder,
};
use cfnkit_resources::iam::policies::assume_role_policy;
use cfnkit_resources::iam::RoleBuilder;
use cfnkit_resources::s3::{AccessControl, BucketBuilder};
use cfnkit_resources::Sample;
use serde_json::json;

#[test]
fn test_site_bucket_renders_access_control() {
    let bucket = BucketBuilder::new()
        .name("site-bucket")
        .access_control(AccessControl::PublicRead)
        .build()
        .unwrap();

    let mut doc = Document::new();
    doc.add_resource(&bucket).unwrap();
    let tree = doc.resolve().unwrap();

    assert_eq!(
        tree["Resources"]["site-bucket"],
        json!({ "Type": "AWS::S3::Bucket", "Properties": { "AccessControl": "PublicRead" } })
    );
}

#[test]
fn test_default_action_in_pipeline_document() {
    let action = ActionBuilder::new()
        .name("Approve")
        .action_type(
            ActionTypeIdBuilder::new()
                .category(cfnkit_resources::codepipeline::ActionCategory::Approval)
                .owner(cfnkit_resources::codepipeline::ActionOwner::Aws)
                .version("1")
                .provider("Manual")
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let stage = StageBuilder::new()
        .name("Gate")
        .add_action(action)
        .build()
        .unwrap();

    let store = BucketBuilder::new().name("Artifacts").build().unwrap();
    let role = RoleBuilder::new()
        .name("PipelineRole")
        .assume_role_policy(assume_role_policy("codepipeline.amazonaws.com").unwrap())
        .build()
        .unwrap();
    let pipeline = PipelineBuilder::new()
        .name("Release")
        .role(&role)
        .artifact_store(&store)
        .add_stage(stage)
        .build()
        .unwrap();

    let mut doc = Document::new();
    doc.add_resource(&store)
        .unwrap()
        .add_resource(&role)
        .unwrap()
        .add_resource(&pipeline)
        .unwrap();
    let tree = doc.resolve().unwrap();

    let rendered_action = &tree["Resources"]["Release"]["Properties"]["Stages"][0]["Actions"][0];
    assert_eq!(rendered_action["RunOrder"], json!("1"));
    assert_eq!(rendered_action["Configuration"], json!({}));
    assert_eq!(rendered_action["OutputArtifacts"], json!([]));
    assert_eq!(
        tree["Resources"]["Release"]["Properties"]["ArtifactStore"],
        json!({ "Type": "S3", "Location": { "Ref": "Artifacts" } })
    );
}

#[test]
fn test_function_with_missing_role_fails_at_render() {
    let function = FunctionBuilder::new()
        .name("Orphan")
        .source_code(["def handler(event, context):\n", "    return 1\n"])
        .handler("index.handler")
        .role_name("MissingRole")
        .runtime(Runtime::Python312)
        .build()
        .unwrap();

    let mut doc = Document::new();
    doc.add_resource(&function).unwrap();

    match doc.render() {
        Err(CfnError::UnresolvedReference {
            target,
            referenced_by,
        }) => {
            assert_eq!(target, "MissingRole");
            assert_eq!(referenced_by, "Orphan");
        }
        other => panic!("expected unresolved reference, got {:?}", other),
    }
}

#[test]
fn test_role_and_function_share_namespace() {
    let role = RoleBuilder::new()
        .name("Shared")
        .assume_role_policy(assume_role_policy("lambda.amazonaws.com").unwrap())
        .build()
        .unwrap();
    let bucket = BucketBuilder::new().name("Shared").build().unwrap();

    let mut doc = Document::new();
    doc.add_resource(&role).unwrap();
    let err = doc.add_resource(&bucket).unwrap_err();

    assert!(matches!(err, CfnError::DuplicateName(ref name) if name == "Shared"));
    assert_eq!(doc.len(), 1);
}

#[test]
fn test_samples_render_identically_twice() {
    for sample in Sample::all() {
        let doc = sample.build().unwrap();
        assert_eq!(doc.render().unwrap(), doc.render().unwrap());
        assert_eq!(
            doc.render_as(Format::Yaml).unwrap(),
            doc.render_as(Format::Yaml).unwrap()
        );
    }
}

#[test]
fn test_pipeline_sample_resolves_cross_references() {
    let tree = Sample::Pipeline.build().unwrap().resolve().unwrap();
    let props = &tree["Resources"]["ExampleElmPipeline"]["Properties"];

    assert_eq!(
        props["RoleArn"],
        json!({ "Fn::GetAtt": ["ExamplePipelineRole", "Arn"] })
    );
    assert_eq!(
        props["Stages"][1]["Actions"][0]["Configuration"]["ProjectName"],
        json!({ "Ref": "ExampleElmAppBuilder" })
    );
    assert_eq!(
        props["DisableInboundStageTransitions"][0]["StageName"],
        "ExampleDeployStage"
    );
    assert_eq!(
        tree["Resources"]["ExampleElmAppBuilder"]["Properties"]["Name"],
        json!({ "Fn::Sub": "ExampleElmAppBuilder-${AWS::StackName}" })
    );
}

#[test]
fn test_website_sample_output() {
    let tree = Sample::Website.build().unwrap().resolve().unwrap();

    assert_eq!(
        tree["Resources"]["ExampleWebsite"]["Properties"]["WebsiteConfiguration"],
        json!({ "IndexDocument": "index.html", "ErrorDocument": "error.html" })
    );
    assert_eq!(
        tree["Outputs"]["ExampleWebsiteURL"]["Value"],
        json!({ "Fn::GetAtt": ["ExampleWebsite", "WebsiteURL"] })
    );
}
