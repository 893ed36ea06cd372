/// Display name and label anchor for a country.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Country {
    pub iso3: &'static str,
    pub name: &'static str,
    /// `[longitude, latitude]` in degrees.
    pub centroid: [f64; 2],
}

const fn c(iso3: &'static str, name: &'static str, lon: f64, lat: f64) -> Country {
    Country {
        iso3,
        name,
        centroid: [lon, lat],
    }
}

pub static COUNTRIES: &[Country] = &[
    // South America
    c("BRA", "Brasil", -51.93, -14.24),
    c("GUF", "Guiana Francesa", -53.13, 3.93),
    c("SUR", "Suriname", -56.03, 3.92),
    c("GUY", "Guiana", -58.93, 4.86),
    c("VEN", "Venezuela", -66.59, 6.42),
    c("COL", "Colômbia", -74.30, 4.57),
    c("ECU", "Equador", -78.18, -1.83),
    c("PER", "Peru", -75.02, -9.19),
    c("BOL", "Bolívia", -63.59, -16.29),
    c("CHL", "Chile", -71.54, -35.68),
    c("PRY", "Paraguai", -58.44, -23.44),
    c("ARG", "Argentina", -63.62, -38.42),
    c("URY", "Uruguai", -55.77, -32.52),
    // East and Southeast Asia
    c("CHN", "China", 104.20, 35.86),
    c("JPN", "Japão", 138.25, 36.20),
    c("KOR", "Coreia do Sul", 127.77, 35.91),
    c("PRK", "Coreia do Norte", 127.51, 40.34),
    c("PHL", "Filipinas", 121.77, 12.88),
    c("IDN", "Indonésia", 113.92, -0.79),
    c("BTN", "Butão", 90.43, 27.51),
    c("MNG", "Mongólia", 103.85, 46.86),
    c("LAO", "Laos", 102.50, 19.86),
    c("NPL", "Nepal", 84.12, 28.39),
    c("VNM", "Vietnã", 108.28, 14.06),
    c("BRN", "Brunei", 114.73, 4.54),
    c("MYS", "Malásia", 101.98, 4.21),
    c("TLS", "Timor-Leste", 125.73, -8.87),
    c("KAZ", "Cazaquistão", 66.92, 48.02),
    c("KHM", "Camboja", 104.99, 12.57),
    c("THA", "Tailândia", 100.99, 15.87),
    c("MMR", "Mianmar", 95.96, 21.91),
    c("SGP", "Singapura", 103.82, 1.35),
    c("TWN", "Taiwan", 120.96, 23.70),
    // Southern Europe
    c("PRT", "Portugal", -8.22, 39.40),
    c("ESP", "Espanha", -3.75, 40.46),
    c("FRA", "França", 2.21, 46.23),
    c("AND", "Andorra", 1.60, 42.55),
    c("MCO", "Mônaco", 7.41, 43.75),
    c("ITA", "Itália", 12.57, 41.87),
    c("MLT", "Malta", 14.38, 35.94),
    c("VAT", "Vaticano", 12.45, 41.90),
    c("SMR", "San Marino", 12.46, 43.94),
    // Central and Southern Africa
    c("GNQ", "Guiné Equatorial", 10.27, 1.65),
    c("GAB", "Gabão", 11.61, -0.80),
    c("COG", "Congo", 15.83, -0.23),
    c("COD", "República Democrática do Congo", 21.76, -4.04),
    c("UGA", "Uganda", 32.29, 1.37),
    c("KEN", "Quênia", 37.91, -0.02),
    c("RWA", "Ruanda", 29.87, -1.94),
    c("BDI", "Burundi", 29.92, -3.37),
    c("TZA", "Tanzânia", 34.89, -6.37),
    c("AGO", "Angola", 17.87, -11.20),
    c("ZMB", "Zâmbia", 27.85, -13.13),
    c("MWI", "Malawi", 34.30, -13.25),
    c("MOZ", "Moçambique", 35.53, -18.67),
    c("ZWE", "Zimbábue", 29.15, -19.02),
    c("BWA", "Botsuana", 24.68, -22.33),
    c("NAM", "Namíbia", 18.49, -22.96),
    c("ZAF", "África do Sul", 22.94, -30.56),
    c("LSO", "Lesoto", 28.23, -29.61),
    c("SWZ", "Essuatíni", 31.47, -26.52),
    c("MDG", "Madagascar", 46.87, -18.77),
    c("STP", "São Tomé e Príncipe", 6.61, 0.19),
    c("MUS", "Maurício", 57.55, -20.35),
    c("SYC", "Seicheles", 55.49, -4.68),
    c("COM", "Comores", 43.87, -11.88),
    // Central America and the Caribbean
    c("GTM", "Guatemala", -90.23, 15.78),
    c("BLZ", "Belize", -88.50, 17.19),
    c("SLV", "El Salvador", -88.90, 13.79),
    c("HND", "Honduras", -86.24, 15.20),
    c("NIC", "Nicarágua", -85.21, 12.87),
    c("CRI", "Costa Rica", -83.75, 9.75),
    c("PAN", "Panamá", -80.78, 8.54),
    c("BHS", "Bahamas", -77.40, 25.03),
    c("CUB", "Cuba", -77.78, 21.52),
    c("JAM", "Jamaica", -77.30, 18.11),
    c("HTI", "Haiti", -72.29, 18.97),
    c("DOM", "República Dominicana", -70.16, 18.74),
    c("PRI", "Porto Rico", -66.59, 18.22),
    c("KNA", "São Cristóvão e Névis", -62.78, 17.36),
    c("ATG", "Antígua e Barbuda", -61.80, 17.06),
    c("MSR", "Montserrat", -62.19, 16.74),
    c("DMA", "Dominica", -61.37, 15.41),
    c("LCA", "Santa Lúcia", -60.98, 13.91),
    c("BRB", "Barbados", -59.54, 13.19),
    c("GRD", "Granada", -61.68, 12.26),
    c("TTO", "Trinidad e Tobago", -61.22, 10.69),
    c("VCT", "São Vicente e Granadinas", -61.29, 12.98),
    // British Isles and Nordics
    c("GBR", "Reino Unido", -3.44, 55.38),
    c("IRL", "Irlanda", -8.24, 53.41),
    c("ISL", "Islândia", -19.02, 64.96),
    c("NOR", "Noruega", 8.47, 60.47),
    c("SWE", "Suécia", 18.64, 60.13),
    c("FIN", "Finlândia", 25.75, 61.92),
    // North America
    c("USA", "Estados Unidos", -95.71, 37.09),
    c("CAN", "Canadá", -106.35, 56.13),
    c("MEX", "México", -102.55, 23.63),
    c("GRL", "Groenlândia", -42.60, 71.71),
    // Oceania
    c("AUS", "Austrália", 133.78, -25.27),
    c("PNG", "Papua-Nova Guiné", 143.96, -6.31),
    c("NZL", "Nova Zelândia", 174.89, -40.90),
    c("FJI", "Fiji", 178.07, -17.71),
    c("SLB", "Ilhas Salomão", 160.16, -9.65),
    c("VUT", "Vanuatu", 166.96, -15.38),
    c("WSM", "Samoa", -172.10, -13.76),
    c("KIR", "Kiribati", 173.00, 1.87),
    c("TON", "Tonga", -175.20, -21.18),
    c("FSM", "Micronésia", 158.22, 6.89),
    c("PLW", "Palau", 134.58, 7.51),
    c("MHL", "Ilhas Marshall", 171.18, 7.13),
    c("NRU", "Nauru", 166.93, -0.52),
    c("TUV", "Tuvalu", 179.19, -7.11),
    // Central Europe
    c("CHE", "Suíça", 8.23, 46.82),
    c("BEL", "Bélgica", 4.47, 50.50),
    c("LUX", "Luxemburgo", 6.13, 49.82),
    c("NLD", "Países Baixos", 5.29, 52.13),
    c("DEU", "Alemanha", 10.45, 51.17),
    c("DNK", "Dinamarca", 9.50, 56.26),
    c("POL", "Polônia", 19.15, 51.92),
    c("CZE", "Tchéquia", 15.47, 49.82),
    c("AUT", "Áustria", 14.55, 47.52),
    c("LIE", "Liechtenstein", 9.55, 47.17),
    // Eastern Europe and the Balkans
    c("SVK", "Eslováquia", 19.70, 48.67),
    c("HUN", "Hungria", 19.50, 47.16),
    c("SVN", "Eslovênia", 14.99, 46.15),
    c("HRV", "Croácia", 15.20, 45.10),
    c("BIH", "Bósnia e Herzegovina", 17.68, 43.92),
    c("MNE", "Montenegro", 19.37, 42.71),
    c("SRB", "Sérvia", 21.01, 44.02),
    c("ALB", "Albânia", 20.17, 41.15),
    c("GRC", "Grécia", 21.82, 39.07),
    c("MKD", "Macedônia do Norte", 21.75, 41.61),
    c("BGR", "Bulgária", 25.49, 42.73),
    c("ROU", "Romênia", 24.97, 45.94),
    c("MDA", "Moldávia", 28.37, 47.41),
    c("UKR", "Ucrânia", 31.17, 48.38),
    c("BLR", "Belarus", 27.95, 53.71),
    c("LTU", "Lituânia", 23.88, 55.17),
    c("LVA", "Letônia", 24.60, 56.88),
    c("EST", "Estônia", 25.01, 58.60),
    c("RUS", "Rússia", 105.32, 61.52),
    // North and West Africa, Horn of Africa
    c("MAR", "Marrocos", -7.09, 31.79),
    c("DZA", "Argélia", 1.66, 28.03),
    c("TUN", "Tunísia", 9.54, 33.89),
    c("ESH", "Saara Ocidental", -12.89, 24.22),
    c("MRT", "Mauritânia", -10.94, 21.01),
    c("SEN", "Senegal", -14.45, 14.50),
    c("GMB", "Gâmbia", -15.31, 13.44),
    c("GNB", "Guiné-Bissau", -15.18, 11.80),
    c("GIN", "Guiné", -9.70, 9.95),
    c("SLE", "Serra Leoa", -11.78, 8.46),
    c("LBR", "Libéria", -9.43, 6.43),
    c("CIV", "Costa do Marfim", -5.55, 7.54),
    c("MLI", "Mali", -4.00, 17.57),
    c("BFA", "Burkina Faso", -1.56, 12.24),
    c("GHA", "Gana", -1.02, 7.95),
    c("TGO", "Togo", 0.82, 8.62),
    c("BEN", "Benin", 2.32, 9.31),
    c("NER", "Níger", 8.08, 17.61),
    c("NGA", "Nigéria", 8.68, 9.08),
    c("LBY", "Líbia", 17.23, 26.34),
    c("TCD", "Chade", 18.73, 15.45),
    c("CMR", "Camarões", 12.35, 7.37),
    c("CAF", "República Centro-Africana", 20.94, 6.61),
    c("EGY", "Egito", 30.80, 26.82),
    c("SDN", "Sudão", 30.22, 12.86),
    c("SSD", "Sudão do Sul", 31.31, 6.88),
    c("ETH", "Etiópia", 40.49, 9.15),
    c("SOM", "Somália", 46.20, 5.15),
    c("ERI", "Eritreia", 39.78, 15.18),
    c("DJI", "Djibuti", 42.59, 11.83),
    c("CPV", "Cabo Verde", -24.01, 16.00),
    // Middle East, Caucasus, Central and South Asia
    c("TUR", "Turquia", 35.24, 38.96),
    c("CYP", "Chipre", 33.43, 35.13),
    c("LBN", "Líbano", 35.86, 33.85),
    c("ISR", "Israel", 34.85, 31.05),
    c("PSE", "Palestina", 35.23, 31.95),
    c("JOR", "Jordânia", 36.24, 30.59),
    c("SYR", "Síria", 38.99, 34.80),
    c("IRQ", "Iraque", 43.68, 33.22),
    c("IRN", "Irã", 53.69, 32.43),
    c("GEO", "Geórgia", 43.36, 42.32),
    c("ARM", "Armênia", 45.04, 40.07),
    c("AZE", "Azerbaijão", 47.58, 40.14),
    c("TKM", "Turcomenistão", 59.56, 38.97),
    c("UZB", "Uzbequistão", 64.59, 41.38),
    c("AFG", "Afeganistão", 67.71, 33.94),
    c("TJK", "Tajiquistão", 71.28, 38.86),
    c("KGZ", "Quirguistão", 74.77, 41.20),
    c("PAK", "Paquistão", 69.35, 30.38),
    c("SAU", "Arábia Saudita", 45.08, 23.89),
    c("KWT", "Kuwait", 47.48, 29.31),
    c("BHR", "Bahrein", 50.56, 26.07),
    c("QAT", "Catar", 51.18, 25.35),
    c("ARE", "Emirados Árabes Unidos", 53.85, 23.42),
    c("OMN", "Omã", 55.92, 21.51),
    c("YEM", "Iêmen", 48.52, 15.55),
    c("IND", "Índia", 78.96, 20.59),
    c("LKA", "Sri Lanka", 80.77, 7.87),
    c("MDV", "Maldivas", 73.22, 3.20),
    c("BGD", "Bangladesh", 90.36, 23.68),
];

pub fn country(iso3: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|country| country.iso3 == iso3)
}

/// Display name, falling back to the code itself for unknown countries.
pub fn display_name(iso3: &str) -> &str {
    country(iso3).map_or(iso3, |country| country.name)
}
