//! Scorer-facing workflow: opening a card with an access code, walking the
//! hole-by-hole wizard, confirming holes and closing or re-opening the card.
//!
//! Every write runs under the group's lock and is persisted with a
//! compare-and-swap on the record version, so a hole confirmation either lands
//! completely or not at all.

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        models::{CourseEntity, GroupMemberEntity, TournamentEntity, TournamentStatusEntity},
        tournament_store::TournamentStore,
    },
    dto::{
        scorecard::{
            GroupProgress, GroupStatusResponse, ScoreCell, ScorecardHole, ScorecardPlayer,
            ScorecardResponse, StepView, SubmissionOutcome, SubmitHoleScoresRequest,
            SubmitHoleScoresResponse,
        },
        validation::validate_access_code,
    },
    error::ServiceError,
    scoring::{
        course::CourseLayout,
        gate::{ConfirmOutcome, GateMode},
        handicap::net_for_hole,
        scorecard::HoleEntry,
        sequence::{Step, step_of},
        values::{CourseHandicap, HoleNumber, Strokes, ValueError},
    },
    state::{
        SharedState,
        round::{GroupRound, course_layout, member_handicap},
        state_machine::{GroupEvent, GroupPhase},
        transitions::run_transition_with_broadcast,
    },
};

/// Everything needed to render a group's card.
struct CardContext {
    round: GroupRound,
    tournament: TournamentEntity,
    course: CourseEntity,
    layout: CourseLayout,
    names: HashMap<Uuid, String>,
}

fn normalize_access_code(access_code: &str) -> Result<String, ServiceError> {
    let code = access_code.trim().to_ascii_uppercase();
    validate_access_code(&code)
        .map_err(|err| ServiceError::InvalidInput(format!("invalid access code: {err}")))?;
    Ok(code)
}

async fn load_round_by_code(
    store: &Arc<dyn TournamentStore>,
    access_code: &str,
) -> Result<GroupRound, ServiceError> {
    let code = normalize_access_code(access_code)?;
    let Some(group) = store.find_group_by_access_code(code).await? else {
        return Err(ServiceError::NotFound("code not found".into()));
    };
    GroupRound::try_from(group)
}

async fn load_round(
    store: &Arc<dyn TournamentStore>,
    group_id: Uuid,
) -> Result<GroupRound, ServiceError> {
    let Some(group) = store.find_group(group_id).await? else {
        return Err(ServiceError::NotFound(format!("group `{group_id}` not found")));
    };
    GroupRound::try_from(group)
}

async fn load_context(
    store: &Arc<dyn TournamentStore>,
    round: GroupRound,
) -> Result<CardContext, ServiceError> {
    let tournament_id = round.tournament_id();
    let tournament = store
        .find_tournament(tournament_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("tournament `{tournament_id}` not found")))?;
    let course = store
        .find_course(tournament.course_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("course `{}` not found", tournament.course_id))
        })?;
    let layout = course_layout(&course)?;

    let member_ids: Vec<Uuid> = round.members().iter().map(|m| m.player_id).collect();
    let names: HashMap<Uuid, String> = store
        .find_players(member_ids.clone())
        .await?
        .into_iter()
        .map(|player| (player.id, player.name))
        .collect();
    for player_id in member_ids.iter().filter(|id| !names.contains_key(id)) {
        warn!(%player_id, group_id = %round.id(), "group member has no player record");
    }

    Ok(CardContext {
        round,
        tournament,
        course,
        layout,
        names,
    })
}

impl CardContext {
    fn name_of(&self, player_id: Uuid) -> String {
        self.names
            .get(&player_id)
            .cloned()
            .unwrap_or_else(|| player_id.to_string())
    }

    fn yardage(&self, hole: HoleNumber, tee_color: &str) -> Option<u32> {
        self.course
            .holes
            .iter()
            .find(|entity| entity.number == hole.get())?
            .tees
            .iter()
            .find(|tee| tee.color.eq_ignore_ascii_case(tee_color))
            .map(|tee| tee.yardage)
    }

    fn image_url(&self, hole: HoleNumber) -> Option<String> {
        self.course
            .holes
            .iter()
            .find(|entity| entity.number == hole.get())
            .and_then(|entity| entity.image_url.clone())
    }

    fn player(&self, member: &GroupMemberEntity) -> ScorecardPlayer {
        let holes = self.round.card().player_holes(member.player_id);
        let total: u32 = holes
            .iter()
            .map(|(_, strokes)| u32::from(strokes.get()))
            .sum();
        ScorecardPlayer {
            player_id: member.player_id,
            name: self.name_of(member.player_id),
            course_handicap: member.course_handicap,
            tee_color: member.tee_color.clone(),
            category: member.category.clone(),
            total_strokes: (!holes.is_empty()).then_some(total),
            through: holes.len(),
        }
    }

    fn hole(
        &self,
        step: Step,
        mode: GateMode,
        members: &[&GroupMemberEntity],
        config: &AppConfig,
    ) -> ScorecardHole {
        let gate = self.round.gate();
        let hole = gate.hole_at(step);
        let spec = self.layout.hole(hole);
        let card = self.round.card();

        let scores = members
            .iter()
            .map(|member| {
                let strokes = card.strokes(member.player_id, hole);
                let handicap = member_handicap(member).unwrap_or(CourseHandicap::ZERO);
                ScoreCell {
                    player_id: member.player_id,
                    strokes: strokes.map(Strokes::get),
                    net_strokes: strokes.and_then(|gross| {
                        net_for_hole(
                            gross,
                            handicap,
                            spec.stroke_index,
                            config.handicap_allocation(),
                        )
                    }),
                    yardage: self.yardage(hole, &member.tee_color),
                }
            })
            .collect();

        ScorecardHole {
            step,
            hole: hole.get(),
            par: spec.par.get(),
            stroke_index: spec.stroke_index.map(|index| index.get()),
            image_url: self.image_url(hole),
            complete: card.hole_complete(hole),
            locked: gate.is_locked(step, mode),
            scores,
        }
    }

    fn selected_members(
        &self,
        player_id: Option<Uuid>,
    ) -> Result<Vec<&GroupMemberEntity>, ServiceError> {
        match player_id {
            None => Ok(self.round.members().iter().collect()),
            Some(player_id) => self
                .round
                .member(player_id)
                .map(|member| vec![member])
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "player `{player_id}` is not a member of this group"
                    ))
                }),
        }
    }
}

/// Read-only snapshot of the card behind `access_code`, optionally narrowed to one member.
pub async fn get_scorecard(
    state: &SharedState,
    access_code: &str,
    player_id: Option<Uuid>,
) -> Result<ScorecardResponse, ServiceError> {
    let store = state.require_store().await?;
    let round = load_round_by_code(&store, access_code).await?;
    let ctx = load_context(&store, round).await?;
    let config = state.config();

    let members = ctx.selected_members(player_id)?;
    let mode = ctx.round.mode();
    let sequence = ctx.round.gate().sequence();

    Ok(ScorecardResponse {
        group_id: ctx.round.id(),
        tournament_id: ctx.tournament.id,
        tournament_name: ctx.tournament.name.clone(),
        course_name: ctx.course.name.clone(),
        start_hole: ctx.round.start().get(),
        sequence: sequence.iter().map(|hole| hole.get()).collect(),
        progress: GroupProgress::from(&ctx.round),
        players: members.iter().map(|member| ctx.player(member)).collect(),
        holes: (0..sequence.len())
            .map(|step| ctx.hole(step, mode, &members, &config))
            .collect(),
    })
}

/// Hole shown by the wizard for `requested_step`, clamped to what the card allows.
///
/// Review mode is only available once the card has been re-opened.
pub async fn view_step(
    state: &SharedState,
    access_code: &str,
    requested_step: Step,
    editing: bool,
) -> Result<StepView, ServiceError> {
    let store = state.require_store().await?;
    let round = load_round_by_code(&store, access_code).await?;

    let mode = if editing {
        if !round.phase().is_editing() {
            return Err(ServiceError::InvalidState(
                "re-open the card before reviewing it".into(),
            ));
        }
        GateMode::Editing
    } else if round.phase() == GroupPhase::Completed {
        GateMode::Closed
    } else {
        GateMode::Normal
    };

    let ctx = load_context(&store, round).await?;
    let config = state.config();
    let step = ctx.round.gate().navigate(requested_step, mode);
    let members: Vec<&GroupMemberEntity> = ctx.round.members().iter().collect();

    Ok(StepView {
        group_id: ctx.round.id(),
        requested_step,
        step,
        editing,
        progress: GroupProgress::from(&ctx.round),
        hole: ctx.hole(step, mode, &members, &config),
    })
}

fn parse_entries(request: &SubmitHoleScoresRequest) -> Result<Vec<HoleEntry>, ServiceError> {
    request
        .scores
        .iter()
        .map(|input| {
            Ok(HoleEntry {
                player_id: input.player_id,
                strokes: Strokes::try_from(input.strokes)?,
            })
        })
        .collect::<Result<Vec<_>, ValueError>>()
        .map_err(Into::into)
}

fn ensure_expected_version(round: &GroupRound, expected: Option<u64>) -> Result<(), ServiceError> {
    match expected {
        Some(expected) if expected != round.version() => Err(ServiceError::Conflict(format!(
            "scorecard changed since it was loaded (expected version {expected}, current {})",
            round.version()
        ))),
        _ => Ok(()),
    }
}

/// Move a scheduled tournament to in progress once a first score lands.
///
/// The write only applies while the tournament is still scheduled, so a status
/// set by an administrator in the meantime is kept.
async fn promote_tournament(store: &Arc<dyn TournamentStore>, tournament_id: Uuid) {
    match store
        .update_tournament_status_if(
            tournament_id,
            TournamentStatusEntity::Scheduled,
            TournamentStatusEntity::InProgress,
        )
        .await
    {
        Ok(true) => info!(%tournament_id, "tournament in progress"),
        Ok(false) => {}
        Err(err) => warn!(%tournament_id, error = %err, "failed to promote tournament"),
    }
}

/// Confirm one hole for the whole group.
///
/// The submission is merged with what the card already holds for the hole; the
/// merged hole must have a score for every member. Re-submitting confirmed
/// values is a no-op that still succeeds.
pub async fn submit_hole_scores(
    state: &SharedState,
    group_id: Uuid,
    hole: u8,
    request: SubmitHoleScoresRequest,
) -> Result<SubmitHoleScoresResponse, ServiceError> {
    let hole = HoleNumber::try_from(hole)?;
    let entries = parse_entries(&request)?;
    let store = state.require_store().await?;

    let mut machine = state.lock_group(group_id).await;
    let round = load_round(&store, group_id).await?;
    ensure_expected_version(&round, request.expected_version)?;
    machine.restore(round.phase(), round.version());

    let step = step_of(round.start(), hole);
    let confirmation = round.gate().confirm_hole(step, &entries, round.mode())?;

    if confirmation.outcome == ConfirmOutcome::Unchanged {
        debug!(%group_id, %hole, step, "hole re-submitted with identical scores");
        return Ok(SubmitHoleScoresResponse {
            group_id,
            hole: hole.get(),
            step,
            outcome: SubmissionOutcome::Unchanged,
            progress: GroupProgress::from(&round),
        });
    }

    let event = GroupEvent::HoleConfirmed {
        step,
        highest_confirmed_step: confirmation.highest_confirmed_step,
    };
    let expected_version = round.version();
    let tournament_id = round.tournament_id();
    let writer = store.clone();
    let card = confirmation.card;
    let updated = run_transition_with_broadcast(
        state,
        &mut machine,
        event,
        Some(hole),
        |phase, version| {
            let next = round.next_record(&card, phase, version);
            async move {
                writer.update_group(next.clone(), expected_version).await?;
                Ok(next)
            }
        },
    )
    .await?;
    drop(machine);

    let outcome = match confirmation.outcome {
        ConfirmOutcome::Advanced => SubmissionOutcome::Advanced,
        ConfirmOutcome::Updated | ConfirmOutcome::Unchanged => SubmissionOutcome::Updated,
    };
    info!(
        %group_id,
        %hole,
        step,
        ?outcome,
        version = updated.version(),
        "hole confirmed"
    );

    promote_tournament(&store, tournament_id).await;

    Ok(SubmitHoleScoresResponse {
        group_id,
        hole: hole.get(),
        step,
        outcome,
        progress: GroupProgress::from(&updated),
    })
}

/// Persist a phase change that leaves the scores untouched.
async fn change_phase(
    state: &SharedState,
    group_id: Uuid,
    choose: impl FnOnce(&GroupRound) -> Result<Option<GroupEvent>, ServiceError>,
) -> Result<GroupStatusResponse, ServiceError> {
    let store = state.require_store().await?;
    let mut machine = state.lock_group(group_id).await;
    let round = load_round(&store, group_id).await?;
    machine.restore(round.phase(), round.version());

    let Some(event) = choose(&round)? else {
        return Ok(GroupStatusResponse {
            group_id,
            progress: GroupProgress::from(&round),
        });
    };

    let expected_version = round.version();
    let updated = run_transition_with_broadcast(
        state,
        &mut machine,
        event,
        None,
        |phase, version| {
            let next = round.next_record(round.card(), phase, version);
            async move {
                store.update_group(next.clone(), expected_version).await?;
                Ok(next)
            }
        },
    )
    .await?;

    info!(%group_id, ?event, phase = ?updated.phase(), "group phase changed");
    Ok(GroupStatusResponse {
        group_id,
        progress: GroupProgress::from(&updated),
    })
}

/// Close the card. Finishing an already closed card is a no-op; finishing a
/// card under review saves the edits and closes it again.
pub async fn finish_group(
    state: &SharedState,
    group_id: Uuid,
) -> Result<GroupStatusResponse, ServiceError> {
    change_phase(state, group_id, |round| match round.phase() {
        GroupPhase::Completed => Ok(None),
        GroupPhase::CompletedEditing => Ok(Some(GroupEvent::SaveEdits)),
        GroupPhase::InProgress { .. } if !round.gate().round_complete() => {
            Err(ServiceError::InvalidState(format!(
                "all holes must be confirmed before finishing (current hole {})",
                round.gate().hole_at(round.gate().current_step())
            )))
        }
        GroupPhase::InProgress { .. } => Ok(Some(GroupEvent::Finish)),
    })
    .await
}

/// Re-open a completed card for review; every hole becomes editable.
pub async fn reopen_group(
    state: &SharedState,
    group_id: Uuid,
) -> Result<GroupStatusResponse, ServiceError> {
    change_phase(state, group_id, |round| match round.phase() {
        GroupPhase::CompletedEditing => Ok(None),
        GroupPhase::Completed => Ok(Some(GroupEvent::Reopen)),
        GroupPhase::InProgress { .. } => Err(ServiceError::InvalidState(
            "only a completed card can be re-opened".into(),
        )),
    })
    .await
}
