/// Pool of planet names drawn (without replacement) for every node but Earth.
pub static PLANET_NAMES: &[&str] = &[
    "Mercury",
    "Venus",
    "Mars",
    "Jupiter",
    "Saturn",
    "Uranus",
    "Neptune",
    "Pluto",
    "Ceres",
    "Eris",
    "Haumea",
    "Makemake",
    "Sedna",
    "Quaoar",
    "Orcus",
    "Io",
    "Europa",
    "Ganymede",
    "Callisto",
    "Titan",
    "Rhea",
    "Iapetus",
    "Dione",
    "Tethys",
    "Enceladus",
    "Mimas",
    "Hyperion",
    "Phoebe",
    "Miranda",
    "Ariel",
    "Umbriel",
    "Titania",
    "Oberon",
    "Triton",
    "Nereid",
    "Charon",
    "Phobos",
    "Deimos",
    "Kepler",
    "Gliese",
    "Proxima",
    "Centauri",
    "Sirius",
    "Vega",
    "Rigel",
    "Betelgeuse",
    "Aldebaran",
    "Antares",
    "Arcturus",
    "Capella",
    "Procyon",
    "Altair",
    "Deneb",
    "Spica",
    "Pollux",
    "Castor",
    "Regulus",
    "Fomalhaut",
    "Achernar",
    "Canopus",
    "Mira",
    "Polaris",
    "Alnilam",
    "Alnitak",
    "Mintaka",
    "Bellatrix",
    "Saiph",
    "Elnath",
    "Alcyone",
    "Maia",
    "Electra",
    "Merope",
    "Taygeta",
    "Celaeno",
    "Sterope",
    "Pleione",
    "Atlas",
    "Thuban",
    "Kochab",
    "Mizar",
    "Alcor",
    "Dubhe",
    "Merak",
    "Phecda",
    "Megrez",
    "Alioth",
    "Alkaid",
    "Algol",
    "Mirfak",
    "Hamal",
    "Sheratan",
    "Menkar",
    "Diphda",
    "Ankaa",
    "Hadar",
    "Acrux",
    "Mimosa",
    "Gacrux",
    "Shaula",
    "Sargas",
    "Kaus",
    "Nunki",
    "Rasalhague",
    "Sabik",
    "Eltanin",
    "Rastaban",
    "Vindemiatrix",
    "Zosma",
    "Denebola",
    "Algieba",
    "Alphard",
    "Suhail",
    "Avior",
    "Miaplacidus",
    "Peacock",
    "Alnair",
    "Tiaki",
    "Enif",
    "Scheat",
    "Markab",
    "Algenib",
    "Alpheratz",
    "Mirach",
    "Almach",
    "Hoth",
    "Tatooine",
    "Arrakis",
    "Solaris",
];
