/// Asserts that the agent with the given id is in the given stance.
#[macro_export]
macro_rules! assert_stance {
    ($world:expr, $id:expr, $stance:expr) => {
        let agent = $world.agent($id).expect("Agent not found in world");
        assert_eq!(
            agent.stance.current, $stance,
            "Agent {} is in {:?} ({:?}), expected {:?}",
            $id, agent.stance.current, agent.stance.substate, $stance
        );
    };
    ($world:expr, $id:expr, $stance:expr, $substate:expr) => {
        let agent = $world.agent($id).expect("Agent not found in world");
        assert_eq!(agent.stance.current, $stance, "Agent {} stance", $id);
        assert_eq!(
            agent.stance.substate.as_deref(),
            Some($substate),
            "Agent {} substate",
            $id
        );
    };
}

/// Asserts that no agent with the given id remains in the world.
#[macro_export]
macro_rules! assert_agent_dead {
    ($world:expr, $id:expr) => {
        assert!(
            $world.agent($id).is_none(),
            "Agent {} should be dead but was found alive",
            $id
        );
    };
}

/// Asserts that the total population count matches the expected value.
#[macro_export]
macro_rules! assert_population {
    ($world:expr, $count:expr) => {
        assert_eq!($world.population(), $count, "Population count mismatch");
    };
}
