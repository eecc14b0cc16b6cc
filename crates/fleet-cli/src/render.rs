//! Plain-text rendering of progress views and schedule reports.

use fleet_rollout::{
    Continuation, PhaseProgress, PhaseTiming, ScheduleReport, SubstateProgress, SubstateStatus,
};

fn plural(count: u64, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

pub fn rollout(id: &str, progress: &PhaseProgress) -> String {
    let mut out = String::new();
    let current = progress
        .current_phase
        .map_or_else(|| "-".to_string(), |index| (index + 1).to_string());
    out.push_str(&format!(
        "Deployment {id}: phase {current} of {}\n",
        progress.phase_count
    ));

    for (index, phase) in progress.phases.iter().enumerate() {
        let marker = if progress.current_phase == Some(index) { '*' } else { ' ' };
        out.push_str(&format!(
            "{marker} phase {:<2} {:>3}%  [{:>5.1}..{:>5.1}]  ok {:>5.1}%  failed {:>5.1}%",
            index + 1,
            phase.batch_size,
            phase.offset,
            phase.offset + phase.width,
            phase.success_width,
            phase.failure_width,
        ));
        if let Some(width) = phase.progress_width {
            out.push_str(&format!("  in progress {width:>5.1}%"));
        }
        out.push('\n');
    }

    if progress.has_next_phase() {
        out.push_str(&format!(
            "Next phase at {} (in {})\n",
            progress.next_phase_start.to_rfc3339(),
            progress.time_until_next_phase
        ));
    }
    if progress.total_failure_count > 0 {
        out.push_str(&format!("{}\n", plural(progress.total_failure_count, "failure")));
    }
    out
}

fn status_label(status: Option<SubstateStatus>) -> &'static str {
    match status {
        Some(SubstateStatus::Finished) => "finished",
        Some(SubstateStatus::Failed) => "failed",
        Some(SubstateStatus::Paused) => "paused",
        Some(SubstateStatus::Inprogress) => "in progress",
        Some(SubstateStatus::PendingPause) => "pause pending",
        None => "",
    }
}

/// Title of the step devices halted after `step` are waiting to enter.
fn held_before(progress: &SubstateProgress, step: usize) -> &'static str {
    progress
        .steps
        .get(step + 1)
        .map_or("next step", |phase| phase.substate.title)
}

pub fn substate(id: &str, progress: &SubstateProgress) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Deployment {id} is {} ({} of {} devices)",
        progress.state.label(),
        progress.device_count,
        progress.total_device_count
    ));
    if progress.total_failure_count > 0 {
        out.push_str(&format!(" with {}", plural(progress.total_failure_count, "failure")));
    }
    out.push('\n');

    for step in &progress.steps {
        out.push_str(&format!(
            "  {:<9} ok {:>5.1}%  failed {:>5.1}%  {}\n",
            step.substate.title,
            step.success_width,
            step.failure_width,
            status_label(step.status)
        ));
    }

    match progress.continuation {
        Continuation::NotPaused => {}
        Continuation::AwaitingDevices { step } => out.push_str(&format!(
            "{} paused before {}; waiting for devices\n",
            plural(progress.paused_count, "device"),
            held_before(progress, step)
        )),
        Continuation::Requested { key, .. } => {
            out.push_str(&format!("Continue requested ({key})\n"));
        }
        Continuation::Armed { step, key } => out.push_str(&format!(
            "{} paused before {}; continue with {key}\n",
            plural(progress.paused_count, "device"),
            held_before(progress, step)
        )),
    }
    out
}

pub fn schedule(id: &str, report: &ScheduleReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Deployment {id} starts {}\n", report.start.to_rfc3339()));
    for phase in &report.phases {
        let timing = match phase.timing {
            PhaseTiming::Upcoming { starts_in_secs } => format!(
                "starts in {}",
                fleet_rollout::format_countdown(chrono::Duration::seconds(starts_in_secs))
            ),
            PhaseTiming::Current => "current".to_string(),
            PhaseTiming::Complete => "complete".to_string(),
            PhaseTiming::Scheduled => "scheduled".to_string(),
        };
        out.push_str(&format!(
            "  phase {:<2} {} {:>3}% {:>6} devices  {timing}\n",
            phase.index + 1,
            phase.start.to_rfc3339(),
            phase.batch_size,
            phase.device_count,
        ));
    }
    if let Some(finished) = report.finished {
        out.push_str(&format!("Finished {}\n", finished.to_rfc3339()));
    }
    out
}
