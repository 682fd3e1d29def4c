use kvmodel::{
    error::{ErrorOrigin, PatchErrorKind},
    prelude::*,
};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
struct Team {
    name: String,
    slug: String,
}

#[derive(Default)]
struct TeamPatch {
    name: Option<String>,
    slug: Option<String>,
}

impl MergePatch for Team {
    type Patch = TeamPatch;

    fn merge(&mut self, patch: TeamPatch) -> Result<(), MergePatchError> {
        if patch.slug.as_deref() == Some("") {
            return Err(MergePatchError::InvalidShape {
                expected: "non-empty slug",
                actual: "empty",
            }
            .with_field("slug"));
        }

        merge_field(&mut self.name, patch.name);
        merge_field(&mut self.slug, patch.slug);

        Ok(())
    }
}

fn team_slug(team: &Team) -> Option<KeyPart> {
    Some(KeyPart::from(&team.slug))
}

impl Model for Team {
    const COLLECTION: &'static str = "teams";
    const INDEXES: &'static [IndexModel<Self>] = &[IndexModel::new("slug", team_slug)];
}

fn team(name: &str, slug: &str) -> Team {
    Team {
        name: name.to_string(),
        slug: slug.to_string(),
    }
}

#[test]
fn session_runs_full_lifecycle() {
    let session = DbSession::new(MemoryKv::new());
    let teams = session.collection::<Team>().unwrap();

    let created = teams.create(team("Core", "core")).unwrap();
    let renamed = teams
        .update(
            &created.id,
            TeamPatch {
                slug: Some("platform".to_string()),
                ..TeamPatch::default()
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(renamed.name, "Core");
    assert!(
        teams
            .find_by_index("slug", "core", Consistency::Strong)
            .unwrap()
            .is_none()
    );
    assert_eq!(
        teams
            .find_by_index("slug", "platform", Consistency::Eventual)
            .unwrap()
            .map(|record| record.id),
        Some(created.id.clone())
    );
    assert!(teams.check_integrity(Consistency::Strong).unwrap().is_consistent());

    assert!(teams.delete(&created.id).unwrap());
    assert_eq!(teams.find_all().count(), 0);
    assert!(session.store().is_empty());
}

#[test]
fn session_reports_public_errors() {
    let session = DbSession::new(MemoryKv::new());
    let teams = session.collection::<Team>().unwrap();
    teams.create(team("Core", "core")).unwrap();

    let err = teams
        .find_by_index("name", "Core", Consistency::Strong)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unsupported);
    assert_eq!(err.origin, ErrorOrigin::Index);

    session.store().conflict_next_commits(1);
    let id = teams.find_all().next().unwrap().unwrap().id;
    let err = teams.delete(&id).unwrap_err();
    assert!(err.is_retryable());

    session.store().fail_next_commits(1);
    let err = teams.create(team("Ops", "ops")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Store);
    assert!(!err.is_retryable());
}

#[test]
fn update_reports_patch_shape_errors() {
    let session = DbSession::new(MemoryKv::new());
    let teams = session.collection::<Team>().unwrap();
    let created = teams.create(team("Core", "core")).unwrap();

    let err = teams
        .update(
            &created.id,
            TeamPatch {
                slug: Some(String::new()),
                ..TeamPatch::default()
            },
        )
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Patch(PatchErrorKind::InvalidShape));
    assert_eq!(err.origin, ErrorOrigin::Patch);
    assert!(err.message.contains("slug"));
    assert_eq!(
        teams.find(&created.id, Consistency::Strong).unwrap(),
        Some(created)
    );
}

#[test]
fn session_loads_config_from_toml() {
    let session = DbSession::from_toml(
        MemoryKv::new(),
        r#"
        consistency = "eventual"
        scan_batch_size = 2
        "#,
    )
    .unwrap();
    assert_eq!(session.db().config().scan_batch_size, 2);

    let teams = session.collection::<Team>().unwrap();
    for i in 0..5 {
        teams.create(team(&format!("t{i}"), &format!("t{i}"))).unwrap();
    }
    assert_eq!(teams.find_all().count(), 5);

    let Err(err) = DbSession::from_toml(MemoryKv::new(), "create_attempts = 0") else {
        panic!("zero create attempts should be rejected");
    };
    assert_eq!(err.kind, ErrorKind::Unsupported);
    assert_eq!(err.origin, ErrorOrigin::Config);
}
