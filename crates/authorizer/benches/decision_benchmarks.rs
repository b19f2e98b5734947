use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use maxperm_apis::{ApiBinding, ApiExport, BoundResource, ExportReference, MaximalPermissionPolicy};
use maxperm_auth::rbac::{ClusterRole, ClusterRoleBinding, PolicyRule, Subject};
use maxperm_auth::{
    Attributes, Authorizer, RequestContext, ResourceRequest, UserInfo, Verdict, authorizer_fn,
};
use maxperm_authorizer::{AuthorizerConfig, MaximalPermissionPolicyAuthorizer};
use maxperm_core::TenantId;
use maxperm_infra::{InMemoryRbacStore, InMemoryTenantIndex, index_binding, index_export};

fn tenant(name: &str) -> TenantId {
    TenantId::parse(name).unwrap()
}

/// One importer bound to one export, with `bindings_per_tenant` unrelated
/// bindings and `owner_grants` unrelated cluster role bindings as noise.
fn setup(bindings_per_tenant: usize, owner_grants: usize) -> MaximalPermissionPolicyAuthorizer {
    let importer = tenant("root:a");
    let owner = tenant("root:b");

    let bindings = Arc::new(InMemoryTenantIndex::new());
    for i in 0..bindings_per_tenant {
        index_binding(
            &bindings,
            ApiBinding {
                tenant: importer.clone(),
                name: format!("noise-{i}"),
                reference: ExportReference::new(owner.clone(), format!("noise-{i}")),
                bound_resources: vec![BoundResource::new(format!("g{i}.example"), "things")],
            },
        );
    }
    index_binding(
        &bindings,
        ApiBinding {
            tenant: importer.clone(),
            name: "widgets".to_string(),
            reference: ExportReference::new(owner.clone(), "export1"),
            bound_resources: vec![BoundResource::new("widgets.example", "widgets")],
        },
    );

    let exports = Arc::new(InMemoryTenantIndex::new());
    index_export(
        &exports,
        ApiExport::new(owner.clone(), "export1")
            .with_maximal_permission_policy(MaximalPermissionPolicy::local()),
    );

    let rbac = Arc::new(InMemoryRbacStore::new());
    rbac.upsert_cluster_role(
        &owner,
        ClusterRole {
            name: "widget-lister".to_string(),
            rules: vec![PolicyRule::new(["list"], ["widgets.example"], ["widgets"])],
        },
    );
    for i in 0..owner_grants {
        rbac.upsert_cluster_role_binding(
            &owner,
            ClusterRoleBinding {
                name: format!("noise-{i}"),
                subjects: vec![Subject::group(format!("maxpermission:team-{i}"))],
                cluster_role: "widget-lister".to_string(),
            },
        );
    }
    rbac.upsert_cluster_role_binding(
        &owner,
        ClusterRoleBinding {
            name: "importing-viewers".to_string(),
            subjects: vec![Subject::group("maxpermission:viewers")],
            cluster_role: "widget-lister".to_string(),
        },
    );

    MaximalPermissionPolicyAuthorizer::new(
        &AuthorizerConfig::default(),
        bindings,
        exports,
        rbac,
        Arc::new(authorizer_fn(|_, _| Ok(Verdict::allow("delegate")))),
    )
}

fn request(group: &str, api_group: &str) -> Attributes {
    Attributes::new(
        UserInfo::new("alice").with_groups([group]),
        ResourceRequest::new("list", api_group, "widgets"),
    )
}

fn bench_decision_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("decision_paths");
    group.sample_size(1000);

    let authz = setup(8, 8);
    let ctx = RequestContext::new().with_tenant(tenant("root:a"));

    let cases = [
        ("unbound", request("viewers", "other.example")),
        ("within_ceiling", request("viewers", "widgets.example")),
        ("outside_ceiling", request("editors", "widgets.example")),
    ];
    for (name, attrs) in &cases {
        group.bench_function(*name, |b| {
            b.iter(|| black_box(authz.authorize(&ctx, black_box(attrs))))
        });
    }

    group.finish();
}

fn bench_binding_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("binding_fanout");
    group.throughput(Throughput::Elements(1));

    for bindings in [1usize, 16, 128, 1024] {
        let authz = setup(bindings, 8);
        let ctx = RequestContext::new().with_tenant(tenant("root:a"));
        let attrs = request("viewers", "widgets.example");

        group.bench_with_input(BenchmarkId::new("within_ceiling", bindings), &bindings, |b, _| {
            b.iter(|| black_box(authz.authorize(&ctx, &attrs)))
        });
    }

    group.finish();
}

fn bench_owner_rbac_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("owner_rbac_size");

    for grants in [1usize, 32, 256] {
        let authz = setup(8, grants);
        let ctx = RequestContext::new().with_tenant(tenant("root:a"));
        let attrs = request("editors", "widgets.example");

        group.bench_with_input(BenchmarkId::new("outside_ceiling", grants), &grants, |b, _| {
            b.iter(|| black_box(authz.authorize(&ctx, &attrs)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decision_paths,
    bench_binding_fanout,
    bench_owner_rbac_size
);
criterion_main!(benches);
