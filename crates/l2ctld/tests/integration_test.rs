//! Integration tests for the controller pipeline.
//!
//! These tests drive the full path the way a transport collaborator
//! would: a topology description is loaded, the spanning tree is built,
//! and frame / lifecycle events flow through the engine, handler, and
//! daemon while a mock callbacks layer records every request the
//! controller emits.

use l2ctld::{
    ControllerCallbacks, ControllerDaemon, Decision, Event, FlowAction, FlowRule,
    ForwardingEngine, FrameEvent, MacAddress, PayloadRef, PortNo, PortState, RulePattern,
    SwitchId, TopologyChangeHandler, TopologyConfig, TopologyState,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Mock switch backend recording controller requests.
#[derive(Default)]
struct MockBackend {
    installs: Mutex<Vec<FlowRule>>,
    deletes: Mutex<Vec<(SwitchId, RulePattern)>>,
    replays: Mutex<Vec<(SwitchId, u64, PortNo, Vec<PortNo>)>>,
}

impl MockBackend {
    fn installs(&self) -> Vec<FlowRule> {
        self.installs.lock().unwrap().clone()
    }

    fn deletes(&self) -> Vec<(SwitchId, RulePattern)> {
        self.deletes.lock().unwrap().clone()
    }

    fn replays(&self) -> Vec<(SwitchId, u64, PortNo, Vec<PortNo>)> {
        self.replays.lock().unwrap().clone()
    }
}

impl ControllerCallbacks for MockBackend {
    fn install_rule(&self, rule: &FlowRule) {
        self.installs.lock().unwrap().push(rule.clone());
    }

    fn delete_rules(&self, switch: SwitchId, pattern: &RulePattern) {
        self.deletes.lock().unwrap().push((switch, *pattern));
    }

    fn replay(
        &self,
        switch: SwitchId,
        payload: PayloadRef,
        in_port: PortNo,
        out_ports: &[PortNo],
    ) {
        self.replays
            .lock()
            .unwrap()
            .push((switch, payload.as_u64(), in_port, out_ports.to_vec()));
    }
}

const RING_TOPOLOGY: &str = r#"
switches:
  - id: 1
    ports:
      1: 2
      2: 4
  - id: 2
    ports:
      1: 1
      2: 3
  - id: 3
    ports:
      1: 2
      2: 4
  - id: 4
    ports:
      1: 3
      2: 1
"#;

fn sw(id: u64) -> SwitchId {
    SwitchId::new(id)
}

fn port(p: u32) -> PortNo {
    PortNo::new(p)
}

fn mac(last: u8) -> MacAddress {
    MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, last])
}

fn frame(switch: u64, in_port: u32, src: u8, dst: u8, buffer: u64) -> FrameEvent {
    FrameEvent {
        switch: sw(switch),
        in_port: port(in_port),
        src: mac(src),
        dst: mac(dst),
        payload: PayloadRef::new(buffer),
    }
}

struct Fixture {
    state: Arc<TopologyState>,
    backend: Arc<MockBackend>,
    engine: Arc<ForwardingEngine>,
    handler: Arc<TopologyChangeHandler>,
}

fn ring_fixture() -> Fixture {
    let config = TopologyConfig::from_yaml(RING_TOPOLOGY).expect("topology parses");
    let graph = config.build_graph().expect("topology is consistent");
    let state = Arc::new(TopologyState::new(graph));
    state.rebuild_tree().expect("ring is connected");

    let backend = Arc::new(MockBackend::default());
    let engine = Arc::new(ForwardingEngine::new(
        Arc::clone(&state),
        backend.clone() as Arc<dyn ControllerCallbacks>,
    ));
    let handler = Arc::new(TopologyChangeHandler::new(
        Arc::clone(&state),
        backend.clone() as Arc<dyn ControllerCallbacks>,
    ));
    Fixture {
        state,
        backend,
        engine,
        handler,
    }
}

#[test]
fn test_ring_tree_shape() {
    let fx = ring_fixture();

    // Root is the lowest id; deterministic tie-break picks (2,3) over
    // (3,4) for the third edge.
    fx.state.with_tree(|tree| {
        let tree = tree.expect("tree built");
        assert_eq!(tree.root(), sw(1));
        assert_eq!(tree.edge_count(), 3);
        assert!(tree.contains_edge(sw(1), sw(2)));
        assert!(tree.contains_edge(sw(1), sw(4)));
        assert!(tree.contains_edge(sw(2), sw(3)));
        assert!(!tree.contains_edge(sw(3), sw(4)));
    });
}

#[test]
fn test_unknown_destination_floods_then_reply_unicasts() {
    let fx = ring_fixture();

    // Host A (behind port 10 of switch 1) talks to unknown host B.
    let decision = fx.engine.handle_frame(&frame(1, 10, 0xaa, 0xbb, 1));
    assert_eq!(
        decision,
        Decision::Flood {
            ports: vec![port(1), port(2)]
        }
    );
    assert!(fx.backend.installs().is_empty());
    assert_eq!(
        fx.backend.replays(),
        vec![(sw(1), 1, port(10), vec![port(1), port(2)])]
    );

    // B answers from behind port 1; A's location is known, so the reply
    // unicasts and installs exactly one rule.
    let decision = fx.engine.handle_frame(&frame(1, 1, 0xbb, 0xaa, 2));
    assert_eq!(decision, Decision::Unicast { port: port(10) });

    let installs = fx.backend.installs();
    assert_eq!(installs.len(), 1);
    assert_eq!(installs[0].switch, sw(1));
    assert_eq!(installs[0].matching.in_port, port(1));
    assert_eq!(installs[0].matching.src, mac(0xbb));
    assert_eq!(installs[0].matching.dst, mac(0xaa));
    assert_eq!(installs[0].action, FlowAction::Output(port(10)));
    assert_eq!(installs[0].idle_timeout, 0);
    assert_eq!(installs[0].hard_timeout, 0);

    // Now A's frames toward B unicast as well.
    let decision = fx.engine.handle_frame(&frame(1, 10, 0xaa, 0xbb, 3));
    assert_eq!(decision, Decision::Unicast { port: port(1) });
}

#[test]
fn test_flood_stays_on_tree_everywhere() {
    let fx = ring_fixture();

    // Switch 3 floods only toward 2; its port toward 4 is the ring
    // chord the tree cut.
    let decision = fx.engine.handle_frame(&frame(3, 10, 0xcc, 0xdd, 4));
    assert_eq!(
        decision,
        Decision::Flood {
            ports: vec![port(1)]
        }
    );

    // Switch 2 floods toward both tree neighbors but not back out the
    // arrival port.
    let decision = fx.engine.handle_frame(&frame(2, 1, 0xee, 0xdd, 5));
    assert_eq!(
        decision,
        Decision::Flood {
            ports: vec![port(2)]
        }
    );
}

#[test]
fn test_discovery_frames_are_ignored() {
    let fx = ring_fixture();

    let mut f = frame(1, 10, 0xaa, 0x00, 6);
    f.dst = MacAddress::LLDP_MULTICAST;
    assert_eq!(fx.engine.handle_frame(&f), Decision::Drop);

    assert_eq!(fx.state.lookup(sw(1), mac(0xaa)), None);
    assert!(fx.backend.replays().is_empty());
}

#[test]
fn test_switch_leave_purges_state_and_rules() {
    let fx = ring_fixture();

    // Learn a host behind switch 3 and one behind its neighbor's port
    // toward 3.
    fx.engine.handle_frame(&frame(3, 10, 0xaa, 0xbb, 7));
    fx.engine.handle_frame(&frame(2, 2, 0xaa, 0xbb, 8));
    assert_eq!(fx.state.lookup(sw(3), mac(0xaa)), Some(port(10)));

    fx.handler.on_switch_leave(sw(3));

    // Learned state referencing 3 is gone everywhere.
    assert_eq!(fx.state.lookup(sw(3), mac(0xaa)), None);
    assert_eq!(fx.state.lookup(sw(2), mac(0xaa)), None);

    // Exactly one delete request, for switch 3, matching everything.
    assert_eq!(fx.backend.deletes(), vec![(sw(3), RulePattern::all())]);

    // The tree was rebuilt over the remaining switches.
    fx.state.with_tree(|tree| {
        let tree = tree.expect("tree still present");
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.edge_count(), 2);
        assert!(!tree.contains_node(sw(3)));
    });

    // Frames attributed to the departed switch degrade to a drop.
    let decision = fx.engine.handle_frame(&frame(3, 10, 0xcc, 0xdd, 9));
    assert_eq!(decision, Decision::Drop);
}

#[test]
fn test_blocked_port_leaves_flood_set_until_forward_again() {
    let fx = ring_fixture();

    fx.handler
        .on_port_state_change(sw(1), port(1), PortState::Listen);
    let decision = fx.engine.handle_frame(&frame(1, 10, 0xaa, 0xbb, 10));
    assert_eq!(
        decision,
        Decision::Flood {
            ports: vec![port(2)]
        }
    );

    fx.handler
        .on_port_state_change(sw(1), port(1), PortState::Forward);
    let decision = fx.engine.handle_frame(&frame(1, 10, 0xaa, 0xbb, 11));
    assert_eq!(
        decision,
        Decision::Flood {
            ports: vec![port(1), port(2)]
        }
    );
}

#[test]
fn test_port_removal_reroutes_flooding() {
    let fx = ring_fixture();

    // Cutting the 1 <-> 2 tree edge forces the tree through 4.
    fx.handler.on_port_removed(sw(1), port(1));

    fx.state.with_tree(|tree| {
        let tree = tree.expect("tree rebuilt");
        assert!(tree.contains_edge(sw(1), sw(4)));
        assert!(tree.contains_edge(sw(3), sw(4)));
        assert!(tree.contains_edge(sw(2), sw(3)));
        assert!(!tree.contains_edge(sw(1), sw(2)));
    });

    let decision = fx.engine.handle_frame(&frame(1, 10, 0xaa, 0xbb, 12));
    assert_eq!(
        decision,
        Decision::Flood {
            ports: vec![port(2)]
        }
    );
}

#[test]
fn test_disconnecting_event_keeps_previous_tree_serving() {
    let fx = ring_fixture();
    let epoch_before = fx.state.tree_epoch();

    // First cut succeeds (ring survives), second isolates switch 3 and
    // the rebuild fails; the last good tree keeps serving.
    fx.handler.on_port_removed(sw(3), port(1));
    let epoch_after_first = fx.state.tree_epoch();
    assert!(epoch_after_first > epoch_before);

    fx.handler.on_port_removed(sw(3), port(2));
    assert_eq!(fx.state.tree_epoch(), epoch_after_first);
    assert!(fx.handler.stats().recompute_failures() >= 1);

    // Forwarding still works for the connected remainder.
    let decision = fx.engine.handle_frame(&frame(1, 10, 0xaa, 0xbb, 13));
    assert!(matches!(decision, Decision::Flood { ports } if !ports.is_empty()));
}

#[tokio::test]
async fn test_daemon_end_to_end() {
    let fx = ring_fixture();
    let (tx, rx) = mpsc::channel(32);
    let daemon = ControllerDaemon::new(Arc::clone(&fx.engine), Arc::clone(&fx.handler), rx);
    let daemon_task = tokio::spawn(daemon.run());

    tx.send(Event::SwitchEnter(sw(1))).await.unwrap();
    tx.send(Event::FrameArrived(frame(1, 10, 0xaa, 0xbb, 20)))
        .await
        .unwrap();
    tx.send(Event::SwitchLeave(sw(3))).await.unwrap();
    tx.send(Event::PortStateChange {
        switch: sw(1),
        port: port(1),
        state: PortState::Block,
    })
    .await
    .unwrap();
    drop(tx);
    daemon_task.await.unwrap();

    assert_eq!(fx.state.lookup(sw(1), mac(0xaa)), Some(port(10)));
    assert!(!fx.state.contains_switch(sw(3)));
    assert_eq!(fx.backend.deletes(), vec![(sw(3), RulePattern::all())]);
    assert_eq!(fx.handler.stats().port_state_changes(), 1);
}
