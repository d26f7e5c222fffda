//! Integration tests for building and synthesizing the Watanabe stacks.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use watanabe_common::types::ResourceKind;
use watanabe_config::MapSource;
use watanabe_graph::resources::security::{Peer, ingress_sources};
use watanabe_graph::{Property, ResourceDeclaration, ResourceGraph};
use watanabe_stack::{DatabaseMode, StackOptions, build_registry_stack, build_stack};

const CERT: &str = "arn:aws:acm:ap-northeast-1:123456789012:certificate/abc";

fn production() -> MapSource {
    MapSource::new()
        .with("DEPLOY_ENV", "production")
        .with("APP_KEY", "K1")
        .with("APP_ENV", "production")
        .with("DB_PASSWORD", "P1")
        .with("ACM_CERTIFICATE_ARN", CERT)
}

fn dev() -> MapSource {
    MapSource::new()
        .with("NODE_ENV", "dev")
        .with("APP_KEY", "K1")
        .with("APP_ENV", "dev")
        .with("APP_URL", "https://dev.example.com")
        .with("ACM_CERTIFICATE_ARN", CERT)
}

fn with_database(mode: DatabaseMode) -> StackOptions {
    StackOptions {
        database: mode,
        ..StackOptions::default()
    }
}

fn decl<'a>(graph: &'a ResourceGraph, id: &str) -> &'a ResourceDeclaration {
    graph.get(id).unwrap_or_else(|| panic!("{id} not declared"))
}

fn text<'a>(decl: &'a ResourceDeclaration, key: &str) -> Option<&'a str> {
    decl.properties().get(key).and_then(Property::as_str)
}

/// Counts events emitted by the graph builder.
#[derive(Clone, Default)]
struct GraphEventCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for GraphEventCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() == "watanabe_graph::graph" {
            let _ = self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_graph_events<T>(build: impl FnOnce() -> T) -> (T, usize) {
    let counter = GraphEventCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let value = tracing::subscriber::with_default(subscriber, build);
    (value, counter.0.load(Ordering::SeqCst))
}

fn env_value(env: &[(String, Property)], name: &str) -> Option<Property> {
    env.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone())
}

fn app_environment(graph: &ResourceGraph) -> Vec<(String, Property)> {
    let task = decl(graph, "WatanabeTaskDefinition");
    let containers = task
        .properties()
        .get("ContainerDefinitions")
        .and_then(Property::as_list)
        .expect("containers");
    let app = containers
        .iter()
        .find(|c| c.get("Name").and_then(Property::as_str) == Some("watanabe-app"))
        .expect("app container");
    app.get("Environment")
        .and_then(Property::as_list)
        .expect("environment")
        .iter()
        .map(|entry| {
            let name = entry.get("Name").and_then(Property::as_str).expect("name");
            let value = entry.get("Value").expect("value").clone();
            (name.to_string(), value)
        })
        .collect()
}

#[test]
fn production_scenario_declares_one_password_database() {
    let stack = build_stack(&production(), &StackOptions::default()).expect("stack");
    let graph = stack.graph();

    let databases: Vec<_> = graph.of_kind(ResourceKind::DatabaseInstance).collect();
    assert_eq!(databases.len(), 1);
    assert_eq!(text(databases[0], "MasterUsername"), Some("postgres"));
    assert_eq!(text(databases[0], "MasterUserPassword"), Some("P1"));
    assert_eq!(text(databases[0], "DBName"), Some("watanabe"));
    assert_eq!(graph.of_kind(ResourceKind::Secret).count(), 0);
}

#[test]
fn dev_without_app_key_declares_nothing() {
    let (result, declared) = count_graph_events(|| {
        build_stack(&dev().without("APP_KEY"), &StackOptions::default())
    });
    let err = result.unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("APP_KEY"), "got: {err}");
    assert_eq!(declared, 0);

    let (result, declared) =
        count_graph_events(|| build_stack(&production(), &StackOptions::default()));
    let stack = result.expect("stack");
    assert!(declared >= stack.graph().len(), "{declared} events");
}

#[test]
fn dev_auto_mode_has_no_database() {
    let stack = build_stack(&dev(), &StackOptions::default()).expect("stack");
    let graph = stack.graph();
    assert_eq!(graph.of_kind(ResourceKind::DatabaseInstance).count(), 0);
    assert!(graph.get("WatanabeDbSg").is_none());
    let env = app_environment(graph);
    assert!(env.iter().all(|(name, _)| name != "DB_HOST"));
}

#[test]
fn security_chain_admits_only_upstream_tier() {
    let stack = build_stack(&production(), &StackOptions::default()).expect("stack");
    let graph = stack.graph();

    let boundaries: Vec<_> = graph.of_kind(ResourceKind::SecurityBoundary).collect();
    assert_eq!(boundaries.len(), 3);

    let source_of = |id: &str| ingress_sources(decl(graph, id).properties());
    assert_eq!(source_of("WatanabeAlbSg"), vec![Some(Peer::AnyIpv4)]);

    for (boundary, upstream) in [
        ("WatanabeFargateSg", "WatanabeAlbSg"),
        ("WatanabeDbSg", "WatanabeFargateSg"),
    ] {
        let sources = source_of(boundary);
        assert_eq!(sources.len(), 1, "{boundary}");
        match &sources[0] {
            Some(Peer::Boundary(r)) => assert_eq!(r.id().as_str(), upstream),
            other => panic!("{boundary} admits {other:?}"),
        }
    }

    let open: Vec<_> = boundaries
        .iter()
        .filter(|b| ingress_sources(b.properties()).contains(&Some(Peer::AnyIpv4)))
        .map(|b| b.id().to_string())
        .collect();
    assert_eq!(open, vec!["WatanabeAlbSg".to_string()]);
}

#[test]
fn every_reference_targets_an_earlier_declaration() {
    for options in [
        StackOptions::default(),
        with_database(DatabaseMode::Generated),
    ] {
        let stack = build_stack(&production(), &options).expect("stack");
        let graph = stack.graph();
        for declaration in graph.declarations() {
            for reference in declaration.references() {
                let target = decl(graph, reference.id().as_str());
                assert!(
                    target.sequence() < declaration.sequence(),
                    "{} references later {}",
                    declaration.id(),
                    target.id()
                );
            }
        }
        graph.validate().expect("valid graph");
    }
}

#[test]
fn service_is_declared_last_after_listener() {
    let stack = build_stack(&production(), &StackOptions::default()).expect("stack");
    let graph = stack.graph();
    let service = decl(graph, "WatanabeFargateService");
    assert_eq!(service.sequence(), graph.len() - 1);
    let ordering: Vec<_> = service.ordering().iter().map(|r| r.id().to_string()).collect();
    assert_eq!(ordering, vec!["WatanabeHttpsListener".to_string()]);
    let order = graph.resolve_order().expect("order");
    let position = |id: &str| order.iter().position(|o| o.as_str() == id).expect(id);
    assert!(position("WatanabeHttpsListener") < position("WatanabeFargateService"));
    assert!(position("WatanabeTargetGroup") < position("WatanabeFargateService"));
}

#[test]
fn generated_mode_references_a_secret() {
    let stack = build_stack(&dev(), &with_database(DatabaseMode::Generated)).expect("stack");
    let graph = stack.graph();
    let secret = decl(graph, "WatanabeDbSecret");
    let database = decl(graph, "WatanabeDb");
    assert_eq!(secret.kind(), ResourceKind::Secret);
    assert!(secret.sequence() < database.sequence());
    assert!(
        graph
            .dependencies("WatanabeDb")
            .iter()
            .any(|(d, _)| d.id().as_str() == "WatanabeDbSecret")
    );
}

#[test]
fn disabled_mode_skips_database_in_production() {
    let stack = build_stack(&production(), &with_database(DatabaseMode::Disabled)).expect("stack");
    assert_eq!(
        stack.graph().of_kind(ResourceKind::DatabaseInstance).count(),
        0
    );
    let env = app_environment(stack.graph());
    assert!(env_value(&env, "DB_PASSWORD").is_none());
    assert!(env_value(&env, "DB_HOST").is_none());
}

#[test]
fn generated_mode_withholds_record_password() {
    let stack = build_stack(&production(), &with_database(DatabaseMode::Generated)).expect("stack");
    let env = app_environment(stack.graph());
    assert!(env_value(&env, "DB_PASSWORD").is_none(), "{env:?}");
    let secret = env_value(&env, "DB_SECRET_ARN").expect("DB_SECRET_ARN");
    assert_eq!(
        secret.as_reference().map(|r| r.id().as_str()),
        Some("WatanabeDbSecret")
    );
    let rendered = decl(stack.graph(), "WatanabeDb").properties().render();
    assert!(!rendered.to_string().contains("P1"));
}

#[test]
fn password_mode_passes_record_password() {
    let stack = build_stack(&production(), &with_database(DatabaseMode::Password)).expect("stack");
    let env = app_environment(stack.graph());
    assert_eq!(
        env_value(&env, "DB_PASSWORD").as_ref().and_then(Property::as_str),
        Some("P1")
    );
    assert!(env_value(&env, "DB_SECRET_ARN").is_none());
}

#[test]
fn database_is_placed_through_subnet_group() {
    let stack = build_stack(&production(), &StackOptions::default()).expect("stack");
    let graph = stack.graph();
    let group = decl(graph, "WatanabeDbSubnetGroup");
    let database = decl(graph, "WatanabeDb");
    assert_eq!(group.kind(), ResourceKind::DatabaseSubnetGroup);
    assert!(group.sequence() < database.sequence());
    let subnets = group
        .properties()
        .get("SubnetIds")
        .and_then(Property::as_list)
        .expect("subnet ids");
    assert_eq!(subnets.len(), graph.of_kind(ResourceKind::Subnet).count() / 2);
    let placed = database
        .properties()
        .get("DBSubnetGroupName")
        .and_then(Property::as_reference)
        .map(|r| r.id().as_str());
    assert_eq!(placed, Some("WatanabeDbSubnetGroup"));
    assert!(database.properties().get("DBSubnetGroup").is_none());
}

#[test]
fn password_mode_without_password_fails() {
    let err = build_stack(&dev(), &with_database(DatabaseMode::Password)).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("DB_PASSWORD"), "got: {err}");
}

#[test]
fn app_container_receives_record_and_connection_env() {
    let stack = build_stack(&production(), &StackOptions::default()).expect("stack");
    let env = app_environment(stack.graph());
    let value = |name: &str| {
        env.iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| panic!("{name} missing"))
    };
    assert_eq!(value("APP_KEY").as_str(), Some("K1"));
    assert_eq!(value("APP_ENV").as_str(), Some("production"));
    let host = value("DB_HOST");
    assert_eq!(host.as_reference().map(|r| r.id().as_str()), Some("WatanabeDb"));
    assert!(value("DB_PORT").as_reference().is_some());
}

#[test]
fn listener_presents_record_certificate() {
    let stack = build_stack(&production(), &StackOptions::default()).expect("stack");
    let rendered = decl(stack.graph(), "WatanabeHttpsListener").properties().render();
    assert_eq!(rendered["Port"], 443);
    assert_eq!(rendered["Certificates"][0]["CertificateArn"], CERT);
}

#[test]
fn missing_certificate_is_a_configuration_error() {
    let err = build_stack(&production().without("ACM_CERTIFICATE_ARN"), &StackOptions::default())
        .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn registry_stack_holds_only_registries() {
    let stack = build_registry_stack(&StackOptions::default()).expect("stack");
    let graph = stack.graph();
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.of_kind(ResourceKind::Registry).count(), 2);
    let template = stack.synthesize().expect("template");
    let app = template.resource("WatanabeAppRepository").expect("app repo");
    assert_eq!(app.deletion_policy.as_deref(), Some("Delete"));
    assert_eq!(app.properties["RepositoryName"], "watanabe-app");
}

#[test]
fn synthesized_template_wires_references() {
    let stack = build_stack(&production(), &StackOptions::default()).expect("stack");
    let template = stack.synthesize().expect("template");
    let json: serde_json::Value =
        serde_json::from_str(&template.to_json().expect("json")).expect("parse");

    let service = &json["Resources"]["WatanabeFargateService"];
    assert_eq!(service["Type"], "AWS::ECS::Service");
    assert_eq!(service["DependsOn"][0], "WatanabeHttpsListener");
    assert_eq!(service["Properties"]["Cluster"]["Ref"], "WatanabeCluster");

    let fargate = &json["Resources"]["WatanabeFargateSg"]["Properties"];
    assert_eq!(
        fargate["SecurityGroupIngress"][0]["SourceSecurityGroupId"]["Fn::GetAtt"][0],
        "WatanabeAlbSg"
    );
    assert!(json["Outputs"]["WatanabeAlbDnsName"].is_object());
    assert_eq!(json["Resources"]["WatanabeDb"]["DeletionPolicy"], "Delete");
}
