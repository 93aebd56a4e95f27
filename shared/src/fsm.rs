use rust_fsm::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestPhase {
    Idle,
    Running,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestEvent {
    Start,
    Complete,
    Reset,
}

impl StateMachineImpl for TestPhase {
    type Input = TestEvent;
    type State = TestPhase;
    type Output = ();
    const INITIAL_STATE: Self::State = TestPhase::Idle;

    fn transition(state: &Self::State, input: &Self::Input) -> Option<Self::State> {
        match (state, input) {
            // a running test is torn down by the caller before restarting
            (_, TestEvent::Start) => Some(TestPhase::Running),
            (TestPhase::Running, TestEvent::Complete) => Some(TestPhase::Finished),
            (_, TestEvent::Reset) => Some(TestPhase::Idle),
            _ => None,
        }
    }

    fn output(_state: &Self::State, _input: &Self::Input) -> Option<Self::Output> {
        None
    }
}

impl Default for TestPhase {
    fn default() -> Self {
        TestPhase::INITIAL_STATE
    }
}
