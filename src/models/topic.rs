//! IB 物理话题目录
//!
//! 目录是封闭的：不在表里的话题 id 会在发起任何网络调用之前被拒绝。

use phf::phf_map;

/// 话题所属主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    /// Theme A
    SpaceTimeMotion,
    /// Theme B
    ParticulateMatter,
    /// Theme C
    WaveBehaviour,
    /// Theme D
    Fields,
    /// Theme E
    NuclearQuantum,
    /// 选修
    Options,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::SpaceTimeMotion,
        Theme::ParticulateMatter,
        Theme::WaveBehaviour,
        Theme::Fields,
        Theme::NuclearQuantum,
        Theme::Options,
    ];

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Theme::SpaceTimeMotion => "Theme A: Space, time and motion",
            Theme::ParticulateMatter => "Theme B: The particulate nature of matter",
            Theme::WaveBehaviour => "Theme C: Wave behaviour",
            Theme::Fields => "Theme D: Fields",
            Theme::NuclearQuantum => "Theme E: Nuclear and quantum physics",
            Theme::Options => "Option Topics",
        }
    }

    /// 该主题下的话题 id，按大纲顺序
    pub fn topic_ids(self) -> &'static [&'static str] {
        match self {
            Theme::SpaceTimeMotion => &[
                "kinematics",
                "forces-momentum",
                "work-energy-power",
                "rigid-body-mechanics",
                "galilean-special-relativity",
            ],
            Theme::ParticulateMatter => &[
                "thermal-energy-transfers",
                "greenhouse-effect",
                "gas-laws",
                "current-circuits",
                "thermodynamics",
            ],
            Theme::WaveBehaviour => &[
                "simple-harmonic-motion",
                "wave-model",
                "wave-phenomena",
                "standing-waves-resonance",
                "doppler-effect",
            ],
            Theme::Fields => &[
                "gravitational-fields",
                "electric-magnetic-fields",
                "motion-electromagnetic-fields",
                "induction",
            ],
            Theme::NuclearQuantum => &[
                "structure-atom",
                "radioactive-decay",
                "fission",
                "fusion-stars",
                "quantum-physics",
            ],
            Theme::Options => &[
                "relativity",
                "engineering-physics",
                "imaging",
                "astrophysics",
                "particle-physics",
            ],
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

static TOPICS: phf::Map<&'static str, (&'static str, Theme)> = phf_map! {
    "kinematics" => ("Kinematics", Theme::SpaceTimeMotion),
    "forces-momentum" => ("Forces and Momentum", Theme::SpaceTimeMotion),
    "work-energy-power" => ("Work, Energy and Power", Theme::SpaceTimeMotion),
    "rigid-body-mechanics" => ("Rigid Body Mechanics (HL)", Theme::SpaceTimeMotion),
    "galilean-special-relativity" => ("Galilean and Special Relativity (HL)", Theme::SpaceTimeMotion),
    "thermal-energy-transfers" => ("Thermal Energy Transfers", Theme::ParticulateMatter),
    "greenhouse-effect" => ("Greenhouse Effect", Theme::ParticulateMatter),
    "gas-laws" => ("Gas Laws", Theme::ParticulateMatter),
    "current-circuits" => ("Current and Circuits", Theme::ParticulateMatter),
    "thermodynamics" => ("Thermodynamics (HL)", Theme::ParticulateMatter),
    "simple-harmonic-motion" => ("Simple Harmonic Motion", Theme::WaveBehaviour),
    "wave-model" => ("Wave Model", Theme::WaveBehaviour),
    "wave-phenomena" => ("Wave Phenomena", Theme::WaveBehaviour),
    "standing-waves-resonance" => ("Standing Waves and Resonance", Theme::WaveBehaviour),
    "doppler-effect" => ("Doppler Effect", Theme::WaveBehaviour),
    "gravitational-fields" => ("Gravitational Fields", Theme::Fields),
    "electric-magnetic-fields" => ("Electric and Magnetic Fields", Theme::Fields),
    "motion-electromagnetic-fields" => ("Motion in Electromagnetic Fields", Theme::Fields),
    "induction" => ("Induction (HL)", Theme::Fields),
    "structure-atom" => ("Structure of the Atom", Theme::NuclearQuantum),
    "radioactive-decay" => ("Radioactive Decay", Theme::NuclearQuantum),
    "fission" => ("Fission", Theme::NuclearQuantum),
    "fusion-stars" => ("Fusion and Stars", Theme::NuclearQuantum),
    "quantum-physics" => ("Quantum Physics (HL)", Theme::NuclearQuantum),
    "relativity" => ("Relativity (Option A)", Theme::Options),
    "engineering-physics" => ("Engineering Physics (Option B)", Theme::Options),
    "imaging" => ("Imaging (Option C)", Theme::Options),
    "astrophysics" => ("Astrophysics (Option D)", Theme::Options),
    "particle-physics" => ("Particle Physics (Option E)", Theme::Options),
};

static TOPIC_CONTEXTS: phf::Map<&'static str, &'static str> = phf_map! {
    "kinematics" => "Focus on displacement, velocity, acceleration, equations of motion, and graphical analysis of motion.",
    "forces-momentum" => "Include Newton's laws, force analysis, momentum conservation, impulse, and collision problems.",
    "work-energy-power" => "Cover work done by forces, kinetic and potential energy, conservation of energy, and power calculations.",
    "rigid-body-mechanics" => "Advanced mechanics including rotational motion, torque, angular momentum, and moment of inertia.",
    "galilean-special-relativity" => "Galilean transformations, special relativity principles, time dilation, and length contraction.",
    "thermal-energy-transfers" => "Heat transfer mechanisms, thermal conductivity, specific heat capacity, and phase changes.",
    "greenhouse-effect" => "Radiation balance, greenhouse gases, albedo, and climate change physics.",
    "gas-laws" => "Ideal gas law, kinetic theory, pressure-volume relationships, and gas behavior.",
    "current-circuits" => "Electric current, resistance, Ohm's law, circuit analysis, and electrical power.",
    "thermodynamics" => "Laws of thermodynamics, heat engines, entropy, and thermodynamic cycles.",
    "simple-harmonic-motion" => "Oscillatory motion, period, frequency, amplitude, and energy in SHM.",
    "wave-model" => "Wave properties, wave equation, wavelength, frequency, and wave speed.",
    "wave-phenomena" => "Reflection, refraction, diffraction, interference, and polarization of waves.",
    "standing-waves-resonance" => "Stationary waves, nodes, antinodes, resonance, and wave superposition.",
    "doppler-effect" => "Frequency shifts due to relative motion between source and observer.",
    "gravitational-fields" => "Gravitational field strength, potential, orbital motion, and Kepler's laws.",
    "electric-magnetic-fields" => "Electric field strength, potential, magnetic field effects, and field interactions.",
    "motion-electromagnetic-fields" => "Charged particle motion in electric and magnetic fields, and electromagnetic forces.",
    "induction" => "Electromagnetic induction, Faraday's law, Lenz's law, and induced EMF.",
    "structure-atom" => "Atomic models, electron energy levels, emission and absorption spectra.",
    "radioactive-decay" => "Radioactive decay processes, half-life, decay constants, and nuclear stability.",
    "fission" => "Nuclear fission process, chain reactions, and fission energy calculations.",
    "fusion-stars" => "Nuclear fusion, stellar nucleosynthesis, and energy production in stars.",
    "quantum-physics" => "Quantum mechanics principles, wave-particle duality, and quantum phenomena.",
    "relativity" => "Special and general relativity, spacetime, relativistic effects, and cosmological applications.",
    "engineering-physics" => "Applied physics in engineering contexts, materials science, and technological applications.",
    "imaging" => "Medical and scientific imaging techniques, optics, and image formation principles.",
    "astrophysics" => "Stellar physics, cosmology, galactic structures, and astronomical phenomena.",
    "particle-physics" => "Fundamental particles, particle interactions, accelerators, and the Standard Model.",
};

/// 没有登记上下文时使用的默认描述
pub const DEFAULT_TOPIC_CONTEXT: &str = "General IB Physics topic";

/// 目录中的一个话题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Topic {
    pub id: &'static str,
    pub name: &'static str,
    pub theme: Theme,
}

impl Topic {
    /// 按 id 精确查找
    pub fn find(id: &str) -> Option<Self> {
        TOPICS
            .get_entry(id.trim())
            .map(|(id, (name, theme))| Topic {
                id: *id,
                name: *name,
                theme: *theme,
            })
    }

    /// 按大纲顺序列出所有话题
    pub fn all() -> impl Iterator<Item = Topic> {
        Theme::ALL
            .into_iter()
            .flat_map(|theme| theme.topic_ids().iter())
            .filter_map(|id| Topic::find(id))
    }

    /// 话题上下文，用于构建提示词
    pub fn context(&self) -> &'static str {
        TOPIC_CONTEXTS
            .get(self.id)
            .copied()
            .unwrap_or(DEFAULT_TOPIC_CONTEXT)
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
