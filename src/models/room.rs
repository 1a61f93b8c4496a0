/// Session lifecycle: created with one participant, active once the second
/// joins, ended on game end or teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomLifecycle {
    Waiting,
    Active,
    Ended,
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub session_id: String,
    pub name: String,
}

/// The session metadata the relay owns: who is paired in which room under
/// what time control. Game state never lives here; each client's engine is
/// authoritative for its own side.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    /// Minutes per side.
    pub time_control: u64,
    players: Vec<Participant>,
    pub lifecycle: RoomLifecycle,
}

impl Room {
    pub fn new(id: String, time_control: u64, creator: Participant) -> Self {
        Self {
            id,
            time_control,
            players: vec![creator],
            lifecycle: RoomLifecycle::Waiting,
        }
    }

    /// Single check-and-append slot allocation. The caller holds the rooms
    /// lock for the whole call, so two racing joins cannot both observe a
    /// free slot.
    pub fn try_join(&mut self, participant: Participant) -> bool {
        if self.lifecycle != RoomLifecycle::Waiting || self.players.len() >= 2 {
            return false;
        }
        self.players.push(participant);
        self.lifecycle = RoomLifecycle::Active;
        true
    }

    pub fn players(&self) -> &[Participant] {
        &self.players
    }

    pub fn player_names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.players.iter().any(|p| p.session_id == session_id)
    }

    /// The other participant, once the room is paired.
    pub fn peer_of(&self, session_id: &str) -> Option<&Participant> {
        self.players.iter().find(|p| p.session_id != session_id)
    }
}
