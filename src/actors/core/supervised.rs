use actix::prelude::*;

// ============================================================================
// Supervised Actor Contract
// ============================================================================
//
// Every child the coordinator starts names itself for health reporting and
// stops on `GracefulStop`.
//
// ============================================================================

/// Message to gracefully stop an actor
#[derive(Message)]
#[rtype(result = "()")]
pub struct GracefulStop;

/// Trait for actors that can be supervised by a coordinator
pub trait SupervisedActor: Actor<Context = Context<Self>> + Handler<GracefulStop> {
    /// Component name used in health reports and logs
    const COMPONENT: &'static str;
}

/// Send `GracefulStop` to a child if it was started
pub fn stop_child<A: SupervisedActor>(child: &Option<Addr<A>>) {
    if let Some(addr) = child {
        tracing::info!(component = A::COMPONENT, "Stopping supervised actor");
        addr.do_send(GracefulStop);
    }
}
