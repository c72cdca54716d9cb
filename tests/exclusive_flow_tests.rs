mod support;

use agrimap_overlay::{
    DirectiveOp, EngineError, EngineOptions, OverlayCommand, RenderDirective,
};
use approx::assert_relative_eq;
use support::{field, render_ops, renders, Harness};

#[tokio::test]
async fn test_activating_second_member_hides_first_then_normalizes() {
    let mut harness = Harness::new();

    harness
        .facade
        .toggle_exclusive("wms", "yield")
        .await
        .expect("yield sollte aktivierbar sein");
    harness.drain();

    harness
        .facade
        .toggle_exclusive("wms", "vhi")
        .await
        .expect("vhi sollte aktivierbar sein");
    let events = harness.drain();

    assert_eq!(
        render_ops(&events),
        vec![
            (DirectiveOp::Hide, Some("yield".to_string())),
            (DirectiveOp::Show, Some("vhi".to_string())),
            (DirectiveOp::NormalizeView, None),
        ]
    );
    assert_eq!(harness.facade.active_member("wms").as_deref(), Some("vhi"));
    assert!(!harness.facade.is_visible("yield"));
}

#[tokio::test]
async fn test_at_most_one_member_visible_across_many_activations() {
    let harness = Harness::new();

    for key in ["yield", "precipitation", "vhi", "yield", "precipitation"] {
        harness
            .facade
            .handle_command(OverlayCommand::ActivateExclusive {
                group_id: "wms".into(),
                key: key.into(),
            })
            .await
            .expect("Aktivierung sollte gelingen");

        let visible = harness.facade.snapshot_visibility();
        let active: Vec<_> = ["yield", "vhi", "precipitation"]
            .into_iter()
            .filter(|member| visible.get(*member).copied().unwrap_or(false))
            .collect();
        assert_eq!(active, vec![key]);
    }
}

#[tokio::test]
async fn test_reactivating_visible_member_only_refreshes_source() {
    let mut harness = Harness::new();
    let activate = || OverlayCommand::ActivateExclusive {
        group_id: "wms".into(),
        key: "yield".into(),
    };

    harness.facade.handle_command(activate()).await.expect("aktiv");
    let first = renders(&harness.drain());
    harness.facade.handle_command(activate()).await.expect("aktiv");
    let second = renders(&harness.drain());

    let first_bust = match &first[0] {
        RenderDirective::Show { cache_bust, .. } => *cache_bust,
        other => panic!("Show erwartet, erhalten {:?}", other),
    };
    assert_eq!(second.len(), 1);
    match &second[0] {
        RenderDirective::SetSource {
            layer_key,
            cache_bust,
            ..
        } => {
            assert_eq!(layer_key, "yield");
            assert!(*cache_bust > first_bust);
        }
        other => panic!("SetSource erwartet, erhalten {:?}", other),
    }
}

#[tokio::test]
async fn test_toggling_active_member_hides_it() {
    let mut harness = Harness::new();

    harness.facade.toggle_exclusive("wms", "yield").await.expect("an");
    harness.drain();
    harness.facade.toggle_exclusive("wms", "yield").await.expect("aus");
    let events = harness.drain();

    assert_eq!(
        render_ops(&events),
        vec![(DirectiveOp::Hide, Some("yield".to_string()))]
    );
    assert_eq!(harness.facade.active_member("wms"), None);
}

#[tokio::test]
async fn test_normalization_can_be_disabled() {
    let options = EngineOptions {
        normalize_view_on_activate: false,
        ..EngineOptions::default()
    };
    let mut harness = Harness::with_options(options);

    harness.facade.toggle_exclusive("wms", "vhi").await.expect("an");
    let events = harness.drain();

    assert_eq!(
        render_ops(&events),
        vec![(DirectiveOp::Show, Some("vhi".to_string()))]
    );
}

#[tokio::test]
async fn test_normalization_centers_on_active_field() {
    let mut harness = Harness::new().with_field().await;

    harness.facade.toggle_exclusive("wms", "yield").await.expect("an");
    let events = renders(&harness.drain());

    let Some(RenderDirective::NormalizeView {
        target_zoom,
        center: Some(center),
    }) = events.last()
    else {
        panic!("NormalizeView mit Zentrum erwartet: {:?}", events);
    };
    assert_eq!(*target_zoom, 9);
    let expected = field().geometry.centroid().expect("Zentrum");
    assert_relative_eq!(center.x, expected.x, epsilon = 1e-9);
    assert_relative_eq!(center.y, expected.y, epsilon = 1e-9);
}

#[tokio::test]
async fn test_layer_outside_group_is_rejected() {
    let mut harness = Harness::new();

    let result = harness.facade.toggle_exclusive("wms", "maize").await;

    assert!(matches!(result, Err(EngineError::InvalidKey(key)) if key == "maize"));
    assert!(harness.drain().is_empty());
}

#[tokio::test]
async fn test_opacity_is_clamped_and_survives_reactivation() {
    let mut harness = Harness::new();

    harness.facade.set_opacity("vhi", 1.7).await.expect("Deckkraft");
    harness.facade.toggle_exclusive("wms", "vhi").await.expect("an");
    let events = renders(&harness.drain());

    assert_relative_eq!(harness.facade.snapshot_opacity()["vhi"], 1.0);
    let shown = events.iter().find_map(|directive| match directive {
        RenderDirective::Show { opacity, .. } => Some(*opacity),
        _ => None,
    });
    assert_eq!(shown, Some(1.0));
}

#[tokio::test]
async fn test_layer_time_updates_visible_image_service() {
    let mut harness = Harness::new();
    harness.facade.toggle_exclusive("wms", "yield").await.expect("an");
    harness.drain();

    harness
        .facade
        .set_layer_time("yield", "2024-06-01")
        .await
        .expect("Zeitparameter");
    let events = renders(&harness.drain());

    assert_eq!(events.len(), 1);
    match &events[0] {
        RenderDirective::SetSource { source, .. } => {
            assert_eq!(source.time(), Some("2024-06-01"));
        }
        other => panic!("SetSource erwartet, erhalten {:?}", other),
    }
}
