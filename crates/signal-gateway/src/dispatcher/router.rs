//! Reaction router
//!
//! Narrows decoded dispatches to the configured guild and control channel,
//! resolves members against the known-identity table and emits at most one
//! routed command per event, in receive order.

use signal_core::{CommandKind, GatewayIntents, KnownIdentityTable, RoutedCommand, Snowflake};
use std::collections::HashSet;

use super::DispatchEvent;
use crate::events::{MessageReactionEvent, PresenceEvent};

/// Outstanding special-role reactions tracked at once
const MAX_SPECIAL_REACTIONS: usize = 256;

/// One reaction: who, on which message, with which emoji
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReactionKey {
    user_id: Snowflake,
    message_id: Snowflake,
    emoji: String,
}

impl ReactionKey {
    fn of(reaction: &MessageReactionEvent) -> Self {
        let emoji = match (&reaction.emoji.id, &reaction.emoji.name) {
            (Some(id), _) => id.to_string(),
            (None, Some(name)) => name.clone(),
            (None, None) => String::new(),
        };
        Self {
            user_id: reaction.user_id,
            message_id: reaction.message_id,
            emoji,
        }
    }
}

/// Guild and channel the dispatcher listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchScope {
    pub guild_id: Snowflake,
    pub control_channel_id: Snowflake,
}

impl DispatchScope {
    #[must_use]
    pub fn new(guild_id: Snowflake, control_channel_id: Snowflake) -> Self {
        Self {
            guild_id,
            control_channel_id,
        }
    }

    /// Events without a guild id are not rejected here
    fn in_guild(&self, guild_id: Option<Snowflake>) -> bool {
        guild_id.map_or(true, |id| id == self.guild_id)
    }

    fn in_control_channel(&self, channel_id: Snowflake, guild_id: Option<Snowflake>) -> bool {
        channel_id == self.control_channel_id && self.in_guild(guild_id)
    }
}

/// Routes dispatch events to signal commands
#[derive(Debug)]
pub struct EventDispatcher {
    intents: GatewayIntents,
    scope: DispatchScope,
    identities: KnownIdentityTable,
    /// Identities currently holding the special role, by slot
    flagged: Vec<bool>,
    /// Reactions added with the special role still in effect
    ///
    /// Removals carry no member roles, so the matching remove is recognised
    /// from here.
    special_reactions: HashSet<ReactionKey>,
}

impl EventDispatcher {
    #[must_use]
    pub fn new(
        intents: GatewayIntents,
        scope: DispatchScope,
        identities: KnownIdentityTable,
    ) -> Self {
        let flagged = vec![false; identities.len()];
        Self {
            intents,
            scope,
            identities,
            flagged,
            special_reactions: HashSet::new(),
        }
    }

    pub fn intents(&self) -> GatewayIntents {
        self.intents
    }

    pub fn scope(&self) -> DispatchScope {
        self.scope
    }

    pub fn identities(&self) -> &KnownIdentityTable {
        &self.identities
    }

    /// Route one dispatch event
    ///
    /// Returns `None` when the event is out of scope, not subscribed to, or about
    /// a member that is not in the identity table.
    pub fn route(&mut self, event: &DispatchEvent) -> Option<RoutedCommand> {
        let event_type = event.event_type()?;

        if let Some(required) = event_type.required_intent() {
            if !self.intents.allows(required) {
                tracing::debug!(event = %event_type, "Dropping event outside subscribed intents");
                return None;
            }
        }

        let command = match event {
            DispatchEvent::ReactionAdd(reaction) => {
                self.route_reaction(reaction, CommandKind::ReactionAdded)
            }
            DispatchEvent::ReactionRemove(reaction) => {
                self.route_reaction(reaction, CommandKind::ReactionRemoved)
            }
            DispatchEvent::MessageCreate(message) => {
                let mentions_role = self
                    .scope
                    .in_control_channel(message.channel_id, message.guild_id)
                    && self.identities.has_special_role(&message.mention_roles);
                mentions_role
                    .then(|| RoutedCommand::for_special_role(CommandKind::RoleMentioned))
            }
            DispatchEvent::MemberUpdate(update) => {
                if update.guild_id != self.scope.guild_id {
                    return None;
                }
                self.route_member_roles(update.user.id, &update.roles)
            }
            DispatchEvent::Presence(presence) => self.route_presence(presence),
            DispatchEvent::TypingStart(typing) => {
                if !self.scope.in_control_channel(typing.channel_id, typing.guild_id) {
                    return None;
                }
                self.for_known(typing.user_id, CommandKind::TypingStarted)
            }
            DispatchEvent::VoiceState(voice) => {
                if !self.scope.in_guild(voice.guild_id) {
                    return None;
                }
                let kind = if voice.is_leave() {
                    CommandKind::VoiceLeft
                } else {
                    CommandKind::VoiceJoined
                };
                self.for_known(voice.user_id, kind)
            }
            DispatchEvent::Ready(_) | DispatchEvent::Resumed | DispatchEvent::Unknown { .. } => {
                None
            }
        };

        if let Some(command) = &command {
            tracing::debug!(event = %event_type, command = %command, "Routed event");
        }
        command
    }

    fn route_reaction(
        &mut self,
        reaction: &MessageReactionEvent,
        kind: CommandKind,
    ) -> Option<RoutedCommand> {
        if !self
            .scope
            .in_control_channel(reaction.channel_id, reaction.guild_id)
        {
            tracing::trace!(
                channel_id = %reaction.channel_id,
                "Reaction outside control channel"
            );
            return None;
        }

        if self.reacts_as_special(reaction, kind) {
            return Some(RoutedCommand::for_special_role(kind));
        }

        let command = match self.identities.resolve(reaction.user_id) {
            Some(slot) => RoutedCommand::for_identity(kind, slot),
            None => RoutedCommand::unresolved(kind),
        };
        Some(command)
    }

    /// Whether a reaction targets the special role rather than the reactor
    ///
    /// An add and its remove always land on the same target.
    fn reacts_as_special(&mut self, reaction: &MessageReactionEvent, kind: CommandKind) -> bool {
        let key = ReactionKey::of(reaction);
        let holds_role = self.identities.has_special_role(reaction.member_roles())
            || self.is_flagged(reaction.user_id);

        if kind == CommandKind::ReactionRemoved {
            return self.special_reactions.remove(&key) || holds_role;
        }

        if holds_role {
            if self.special_reactions.len() < MAX_SPECIAL_REACTIONS {
                self.special_reactions.insert(key);
            } else {
                tracing::warn!(
                    user_id = %reaction.user_id,
                    "Too many special reactions tracked; its removal may not clear the effect"
                );
            }
        }
        holds_role
    }

    fn is_flagged(&self, user_id: Snowflake) -> bool {
        self.identities
            .resolve(user_id)
            .and_then(|slot| self.flagged.get(slot.index()).copied())
            .unwrap_or(false)
    }

    /// Emit `MemberFlagged` only when a known member gains the special role
    fn route_member_roles(
        &mut self,
        user_id: Snowflake,
        roles: &[Snowflake],
    ) -> Option<RoutedCommand> {
        let slot = self.identities.resolve(user_id)?;
        let index = slot.index();
        let has_role = self.identities.has_special_role(roles);
        let was_flagged = self.flagged.get(index).copied().unwrap_or(false);

        if let Some(flag) = self.flagged.get_mut(index) {
            *flag = has_role;
        }

        (has_role && !was_flagged)
            .then(|| RoutedCommand::for_identity(CommandKind::MemberFlagged, slot))
    }

    fn route_presence(&self, presence: &PresenceEvent) -> Option<RoutedCommand> {
        if !self.scope.in_guild(presence.guild_id) {
            return None;
        }
        let kind = if presence.status.is_present() {
            CommandKind::PresenceOnline
        } else {
            CommandKind::PresenceOffline
        };
        self.for_known(presence.user.id, kind)
    }

    fn for_known(&self, user_id: Snowflake, kind: CommandKind) -> Option<RoutedCommand> {
        self.identities
            .resolve(user_id)
            .map(|slot| RoutedCommand::for_identity(kind, slot))
    }
}
